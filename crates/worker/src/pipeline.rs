use anyhow::{Context, Result};
use casawatch_core::config::Settings;
use casawatch_core::domain::quote::QuoteMap;
use casawatch_core::domain::watchlist::Watchlist;
use casawatch_core::extract::{matched_rows, quotes_from_tables, ExtractionThresholds};
use casawatch_core::ingest::handoff;
use casawatch_core::ingest::page::MarketPageSource;
use casawatch_core::ingest::table::parse_tables;
use casawatch_core::ingest::types::PageTable;
use casawatch_core::notify::Notifier;
use casawatch_core::report::{pair_with_quotes, render_message, ReportHeader};
use casawatch_core::time::market;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub fn load_watchlist(cli_path: Option<&Path>, settings: &Settings) -> Result<Watchlist> {
    let path = cli_path
        .map(Path::to_path_buf)
        .or_else(|| settings.watchlist_path.as_ref().map(PathBuf::from));

    let watchlist = match path {
        Some(path) => Watchlist::load(&path)?,
        None => Watchlist::builtin()?,
    };
    tracing::info!(entries = watchlist.entries().len(), "watchlist loaded");
    Ok(watchlist)
}

/// Fetches the live-market page and extracts a quote for every watchlist symbol it lists.
pub async fn scrape_quotes(source: &dyn MarketPageSource, watchlist: &Watchlist) -> Result<QuoteMap> {
    let tables = fetch_tables(source).await?;
    Ok(extract_quotes(&tables, watchlist))
}

pub async fn fetch_tables(source: &dyn MarketPageSource) -> Result<Vec<PageTable>> {
    let html = source
        .fetch_page()
        .await
        .with_context(|| format!("{} fetch failed", source.source_name()))?;
    let tables = parse_tables(&html)?;
    if tables.is_empty() {
        tracing::warn!(source = source.source_name(), "no tables on market page; layout changed or access blocked");
    }
    Ok(tables)
}

pub fn extract_quotes(tables: &[PageTable], watchlist: &Watchlist) -> QuoteMap {
    let quotes = quotes_from_tables(tables, watchlist, &ExtractionThresholds::default());
    tracing::info!(
        tables = tables.len(),
        matched = quotes.len(),
        priced = quotes.values().filter(|q| q.last_price.is_some()).count(),
        watchlist = watchlist.entries().len(),
        "quotes extracted"
    );
    quotes
}

/// Writes every page row matched to the watchlist with all of its site columns. Returns the
/// number of rows written.
pub fn export_full_rows(path: &Path, tables: &[PageTable], watchlist: &Watchlist) -> Result<usize> {
    let rows = matched_rows(tables, watchlist);
    handoff::write_full_rows(path, &rows)?;
    Ok(rows.len())
}

/// Renders the report for `quotes` and hands it to `notifier`. Returns the message sent.
pub async fn deliver_report(
    notifier: &dyn Notifier,
    settings: &Settings,
    watchlist: &Watchlist,
    quotes: &QuoteMap,
    now_utc: DateTime<Utc>,
) -> Result<String> {
    let as_of = market::market_now(now_utc, settings.utc_offset_hours)?;
    if market::is_weekend(&as_of) {
        tracing::info!(%as_of, "weekend run; prices are the last close");
    }

    let header = ReportHeader {
        test_run: settings.is_test_run(),
        as_of,
    };
    let entries = pair_with_quotes(watchlist, quotes);
    let message = render_message(&header, &entries);

    notifier
        .send(&message)
        .await
        .with_context(|| format!("{} delivery failed", notifier.channel_name()))?;
    Ok(message)
}
