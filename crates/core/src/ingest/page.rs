use crate::config::Settings;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;

// The exchange serves a stripped page to clients that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";
// Backoff doubles from 1s and stops growing at 32s.
const MAX_BACKOFF_EXPONENT: u32 = 5;

#[async_trait::async_trait]
pub trait MarketPageSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Returns the live-market page HTML.
    async fn fetch_page(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpMarketPage {
    http: reqwest::Client,
    url: String,
    retries: u32,
}

impl HttpMarketPage {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .default_headers(default_headers())
            .build()
            .context("failed to build market page http client")?;

        Ok(Self {
            http,
            url: settings.market_url.clone(),
            retries: settings.fetch_retries.max(1),
        })
    }

    async fn fetch_once(&self) -> Result<String> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("market page request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market page body")?;

        if !status.is_success() {
            anyhow::bail!("market page HTTP {status}");
        }
        Ok(text)
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9"));
    headers
}

fn backoff_after(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    Duration::from_secs(1u64 << exponent)
}

#[async_trait::async_trait]
impl MarketPageSource for HttpMarketPage {
    fn source_name(&self) -> &'static str {
        "casablanca_live_market"
    }

    async fn fetch_page(&self) -> Result<String> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once().await {
                Ok(html) => {
                    tracing::info!(url = %self.url, attempt, bytes = html.len(), "fetched market page");
                    return Ok(html);
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err).with_context(|| format!("giving up on {} after {attempt} attempts", self.url));
                    }
                    let backoff = backoff_after(attempt);
                    tracing::warn!(attempt, ?backoff, error = %err, "market page fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_browser_user_agent() {
        let headers = default_headers();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "Mozilla/5.0");
    }

    #[test]
    fn backoff_doubles_then_levels_off() {
        assert_eq!(backoff_after(1), Duration::from_secs(1));
        assert_eq!(backoff_after(2), Duration::from_secs(2));
        assert_eq!(backoff_after(6), Duration::from_secs(32));
        assert_eq!(backoff_after(7), Duration::from_secs(32));
        assert_eq!(backoff_after(u32::MAX), Duration::from_secs(32));
        assert_eq!(backoff_after(0), Duration::from_secs(1));
    }
}
