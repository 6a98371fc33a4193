pub mod domain;
pub mod extract;
pub mod ingest;
pub mod notify;
pub mod report;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_MARKET_URL: &str =
        "https://www.casablanca-bourse.com/fr/live-market/marche-actions-groupement";

    const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_FETCH_RETRIES: u32 = 3;
    const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 20;
    // Morocco runs on UTC+1 outside Ramadan.
    const DEFAULT_UTC_OFFSET_HOURS: i32 = 1;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub telegram_token: Option<String>,
        pub telegram_chat_id: Option<String>,
        pub branch: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_url: String,
        pub watchlist_path: Option<String>,
        pub fetch_timeout_secs: u64,
        pub fetch_retries: u32,
        pub notify_timeout_secs: u64,
        pub utc_offset_hours: i32,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                telegram_token: non_empty_var("TELEGRAM_TOKEN"),
                telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
                branch: non_empty_var("GITHUB_REF_NAME"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                market_url: non_empty_var("CASAWATCH_MARKET_URL")
                    .unwrap_or_else(|| DEFAULT_MARKET_URL.to_string()),
                watchlist_path: non_empty_var("CASAWATCH_WATCHLIST"),
                fetch_timeout_secs: parsed_var("CASAWATCH_FETCH_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
                fetch_retries: parsed_var("CASAWATCH_FETCH_RETRIES")?
                    .unwrap_or(DEFAULT_FETCH_RETRIES),
                notify_timeout_secs: parsed_var("CASAWATCH_NOTIFY_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
                utc_offset_hours: parsed_var("CASAWATCH_UTC_OFFSET_HOURS")?
                    .unwrap_or(DEFAULT_UTC_OFFSET_HOURS),
            })
        }

        pub fn require_telegram_token(&self) -> anyhow::Result<&str> {
            self.telegram_token
                .as_deref()
                .context("TELEGRAM_TOKEN is required")
        }

        pub fn require_telegram_chat_id(&self) -> anyhow::Result<&str> {
            self.telegram_chat_id
                .as_deref()
                .context("TELEGRAM_CHAT_ID is required")
        }

        /// Runs from any branch other than `main` are tagged so test messages are
        /// not mistaken for the real report.
        pub fn is_test_run(&self) -> bool {
            matches!(self.branch.as_deref(), Some(b) if b != "main")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T>(key: &str) -> anyhow::Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        non_empty_var(key)
            .map(|s| s.parse::<T>().with_context(|| format!("{key} is invalid: {s}")))
            .transpose()
    }

}
