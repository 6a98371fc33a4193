use anyhow::Context;
use casawatch_core::config::Settings;
use casawatch_core::ingest::handoff;
use casawatch_core::ingest::page::HttpMarketPage;
use casawatch_core::notify::telegram::TelegramNotifier;
use casawatch_core::notify::{Notifier, StdoutNotifier};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod pipeline;

const DEFAULT_QUOTES_FILE: &str = "watchlist_prices.csv";
const DEFAULT_FULL_FILE: &str = "watchlist_full.csv";
const TEST_MESSAGE: &str = "✅ casawatch: Telegram test message";

#[derive(Debug, Parser)]
#[command(name = "casawatch", about = "Casablanca watchlist scraper and Telegram reporter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print the message instead of sending it to Telegram.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Watchlist JSON file. Overrides CASAWATCH_WATCHLIST; the built-in list is used when
    /// neither is set.
    #[arg(long, global = true)]
    watchlist: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape the live market page and send the report (default).
    Run,

    /// Scrape the live market page and write the quotes file.
    Scrape {
        #[arg(long, default_value = DEFAULT_QUOTES_FILE)]
        quotes_file: PathBuf,

        /// Also export every matched page row with all site columns. Without a value the
        /// file is watchlist_full.csv.
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_FULL_FILE)]
        full_file: Option<PathBuf>,
    },

    /// Build and send the report from a quotes file.
    Report {
        #[arg(long, default_value = DEFAULT_QUOTES_FILE)]
        quotes_file: PathBuf,
    },

    /// Send a fixed message to check the Telegram credentials.
    TestNotify,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match run(args, &settings).await {
        Ok(()) => Ok(()),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "casawatch run failed");
            Err(err)
        }
    }
}

async fn run(args: Args, settings: &Settings) -> anyhow::Result<()> {
    // Configuration problems surface before anything is fetched or sent.
    let load_watchlist = || pipeline::load_watchlist(args.watchlist.as_deref(), settings);

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            let watchlist = load_watchlist()?;
            let notifier = build_notifier(settings, args.dry_run)?;
            let source = HttpMarketPage::from_settings(settings)?;
            let quotes = pipeline::scrape_quotes(&source, &watchlist).await?;
            pipeline::deliver_report(
                notifier.as_ref(),
                settings,
                &watchlist,
                &quotes,
                chrono::Utc::now(),
            )
            .await?;
        }
        Command::Scrape {
            quotes_file,
            full_file,
        } => {
            let watchlist = load_watchlist()?;
            let source = HttpMarketPage::from_settings(settings)?;
            let tables = pipeline::fetch_tables(&source).await?;
            let quotes = pipeline::extract_quotes(&tables, &watchlist);
            handoff::write_quotes(&quotes_file, &quotes)?;
            tracing::info!(path = %quotes_file.display(), quotes = quotes.len(), "quotes file written");

            if let Some(full_file) = full_file {
                let rows = pipeline::export_full_rows(&full_file, &tables, &watchlist)?;
                tracing::info!(path = %full_file.display(), rows, "full rows file written");
            }
        }
        Command::Report { quotes_file } => {
            let watchlist = load_watchlist()?;
            let notifier = build_notifier(settings, args.dry_run)?;
            let quotes = handoff::read_quotes(&quotes_file)
                .with_context(|| format!("run `casawatch scrape` first to produce {}", quotes_file.display()))?;
            pipeline::deliver_report(
                notifier.as_ref(),
                settings,
                &watchlist,
                &quotes,
                chrono::Utc::now(),
            )
            .await?;
        }
        Command::TestNotify => {
            let notifier = build_notifier(settings, args.dry_run)?;
            notifier.send(TEST_MESSAGE).await?;
        }
    }

    Ok(())
}

fn build_notifier(settings: &Settings, dry_run: bool) -> anyhow::Result<Box<dyn Notifier>> {
    if dry_run {
        tracing::info!(dry_run = true, "report will be printed, not sent");
        return Ok(Box::new(StdoutNotifier));
    }
    Ok(Box::new(TelegramNotifier::from_settings(settings)?))
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run_command() {
        let args = Args::try_parse_from(["casawatch", "--dry-run"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.dry_run);
    }

    #[test]
    fn parses_report_with_quotes_file() {
        let args =
            Args::try_parse_from(["casawatch", "report", "--quotes-file", "q.csv", "--dry-run"])
                .unwrap();
        match args.command {
            Some(Command::Report { quotes_file }) => assert_eq!(quotes_file, PathBuf::from("q.csv")),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(args.dry_run);
    }

    #[test]
    fn scrape_uses_default_quotes_file() {
        let args = Args::try_parse_from(["casawatch", "scrape"]).unwrap();
        match args.command {
            Some(Command::Scrape {
                quotes_file,
                full_file,
            }) => {
                assert_eq!(quotes_file, PathBuf::from(DEFAULT_QUOTES_FILE));
                assert_eq!(full_file, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn scrape_full_file_is_opt_in_with_a_default_name() {
        let args = Args::try_parse_from(["casawatch", "scrape", "--full-file"]).unwrap();
        match args.command {
            Some(Command::Scrape { full_file, .. }) => {
                assert_eq!(full_file, Some(PathBuf::from(DEFAULT_FULL_FILE)))
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let args = Args::try_parse_from(["casawatch", "scrape", "--full-file", "all.csv"]).unwrap();
        match args.command {
            Some(Command::Scrape { full_file, .. }) => {
                assert_eq!(full_file, Some(PathBuf::from("all.csv")))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_notify_takes_global_flags() {
        let args = Args::try_parse_from(["casawatch", "test-notify", "--dry-run"]).unwrap();
        assert!(matches!(args.command, Some(Command::TestNotify)));
        assert!(args.dry_run);
    }
}
