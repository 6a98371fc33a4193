use crate::domain::quote::{Quote, QuoteMap};
use crate::domain::recommendation::{recommend, Recommendation};
use crate::domain::watchlist::{Watchlist, WatchlistEntry};
use chrono::{DateTime, FixedOffset};
use std::cmp::Ordering;

pub const NOT_AVAILABLE: &str = "n/a";

/// One evaluated watchlist entry.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub entry: WatchlistEntry,
    pub quote: Quote,
    pub recommendation: Recommendation,
}

/// Pairs each watchlist entry, in configuration order, with its quote. Symbols the page
/// did not yield get an absent quote.
pub fn pair_with_quotes(watchlist: &Watchlist, quotes: &QuoteMap) -> Vec<(WatchlistEntry, Quote)> {
    watchlist
        .entries()
        .iter()
        .map(|entry| {
            let quote = quotes
                .get(&entry.symbol)
                .cloned()
                .unwrap_or_else(|| Quote::missing(&entry.symbol));
            (entry.clone(), quote)
        })
        .collect()
}

/// Evaluates every entry and orders the rows by potential, highest first.
///
/// The sort is stable: rows with equal potential, and rows without one (which go last),
/// keep their input order.
pub fn evaluate(entries: &[(WatchlistEntry, Quote)]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = entries
        .iter()
        .map(|(entry, quote)| {
            let (signal, potential_percent) =
                recommend(quote.last_price, entry.buy_threshold, entry.sell_threshold);
            ReportRow {
                entry: entry.clone(),
                quote: quote.clone(),
                recommendation: Recommendation {
                    symbol: entry.symbol.clone(),
                    signal,
                    potential_percent,
                },
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        cmp_potential_desc(
            a.recommendation.potential_percent,
            b.recommendation.potential_percent,
        )
    });
    rows
}

fn cmp_potential_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn build_report(entries: &[(WatchlistEntry, Quote)]) -> Vec<String> {
    evaluate(entries).iter().map(format_row).collect()
}

pub fn format_row(row: &ReportRow) -> String {
    let entry = &row.entry;
    let signal = row.recommendation.signal;
    format!(
        "- {marker} {symbol} · {symbol}_{signal} : {last} ({pct}) [{buy} → {sell}] • {category} • pot. {potential}",
        marker = signal.marker(),
        symbol = entry.symbol,
        last = opt(row.quote.last_price, format_price),
        pct = opt(row.quote.percent_change, format_percent),
        buy = format_price(entry.buy_threshold),
        sell = opt(entry.sell_threshold, format_price),
        category = if entry.category.is_empty() { "-" } else { entry.category.as_str() },
        potential = opt(row.recommendation.potential_percent, format_percent),
    )
}

fn opt(v: Option<f64>, f: fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Two decimals, then trailing zeros and a dangling point removed: `492.00` → `492`,
/// `492.50` → `492.5`.
pub fn format_price(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" => "0".to_string(),
        _ => s.to_string(),
    }
}

/// Signed, one decimal: `+1.2%`, `-0.4%`.
pub fn format_percent(v: f64) -> String {
    format!("{v:+.1}%")
}

#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub test_run: bool,
    pub as_of: DateTime<FixedOffset>,
}

/// The full chat message: title, timestamp, the sorted lines and a coverage footer.
pub fn render_message(header: &ReportHeader, entries: &[(WatchlistEntry, Quote)]) -> String {
    let rows = evaluate(entries);
    let priced = rows.iter().filter(|r| r.quote.last_price.is_some()).count();
    let prefix = if header.test_run { "[TEST] " } else { "" };

    let mut lines = vec![
        format!("{prefix}📊 Bourse Casa (Auto)"),
        format!("🕒 {}", header.as_of.format("%Y-%m-%d %H:%M")),
        String::new(),
        "🧾 WATCHLIST (sorted by potential)".to_string(),
    ];
    lines.extend(rows.iter().map(format_row));
    lines.push(String::new());
    lines.push(format!("ℹ️ {priced}/{} quotes found", rows.len()));
    lines.join("\n")
}
