use crate::config::Settings;
use crate::notify::Notifier;
use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;

const API_BASE_URL: &str = "https://api.telegram.org";
// Telegram rejects sendMessage text above 4096 characters.
const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token = settings.require_telegram_token()?.to_string();
        let chat_id = settings.require_telegram_chat_id()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.notify_timeout_secs))
            .build()
            .context("failed to build telegram http client")?;

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            token,
            chat_id,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.base_url.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    fn channel_name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let text = truncate_chars(text, MAX_MESSAGE_CHARS);
        let req = SendMessageRequest {
            chat_id: &self.chat_id,
            text: &text,
        };

        // The URL embeds the bot token; keep it out of error messages.
        let res = self
            .http
            .post(self.url())
            .json(&req)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("telegram request failed: {}", e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("failed to read telegram response")?;
        if !status.is_success() {
            anyhow::bail!("telegram sendMessage HTTP {status}: {body}");
        }

        tracing::info!(chat_id = %self.chat_id, chars = text.chars().count(), "telegram message sent");
        Ok(())
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
