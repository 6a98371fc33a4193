pub mod telegram;

/// Delivers a finished report. The report is built whether or not delivery succeeds.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    fn channel_name(&self) -> &'static str;

    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// Prints the message instead of sending it (`--dry-run`).
#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier;

#[async_trait::async_trait]
impl Notifier for StdoutNotifier {
    fn channel_name(&self) -> &'static str {
        "stdout"
    }

    async fn send(&self, text: &str) -> anyhow::Result<()> {
        println!("{text}");
        Ok(())
    }
}
