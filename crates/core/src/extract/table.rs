use super::number::parse_number;
use super::quote::{numeric_values, pick_percent, pick_price, ExtractionThresholds};
use super::row::classify_row;
use crate::domain::quote::{Quote, QuoteMap};
use crate::domain::watchlist::Watchlist;
use crate::ingest::types::{ColumnLayout, PageTable};
use std::collections::HashSet;

/// A page row attributed to a watchlist symbol, with the table it came from.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRow<'a> {
    pub symbol: &'a str,
    pub code: &'a str,
    pub table: &'a PageTable,
    pub cells: &'a [String],
}

/// Every row of every table that belongs to a watchlist symbol, in page order.
///
/// Tables with recognizable headers are matched on their instrument cell only; other
/// tables are matched on the whole row.
pub fn matched_rows<'a>(tables: &'a [PageTable], watchlist: &'a Watchlist) -> Vec<MatchedRow<'a>> {
    let targets = watchlist.target_codes();
    let mut out = Vec::new();

    for table in tables {
        let layout = table.column_layout();
        for cells in &table.rows {
            let Some(code) = row_code(cells, layout, &targets) else {
                continue;
            };
            let Some((code, symbol)) = watchlist.resolve_code(&code) else {
                continue;
            };
            out.push(MatchedRow {
                symbol,
                code,
                table,
                cells,
            });
        }
    }

    out
}

/// Builds the quotes of every watchlist symbol found in the page tables.
///
/// The first row matching a symbol wins. Symbols that match no row are absent from the
/// result. Tables with recognizable headers read price and percent from their columns; the
/// row heuristic fills in whatever those columns leave empty.
pub fn quotes_from_tables(
    tables: &[PageTable],
    watchlist: &Watchlist,
    thresholds: &ExtractionThresholds,
) -> QuoteMap {
    let mut out = QuoteMap::new();

    for row in matched_rows(tables, watchlist) {
        let MatchedRow {
            symbol,
            code,
            table,
            cells,
        } = row;
        if out.contains_key(symbol) {
            tracing::debug!(code, symbol, "symbol already quoted; ignoring later row");
            continue;
        }

        let (last, pct) = row_quote(cells, table.column_layout(), thresholds);
        let quote = Quote::new(symbol, last, pct);
        if quote.last_price.is_none() {
            tracing::warn!(code, symbol, row = %cells.join(" | "), "no price found in matched row");
        }
        out.insert(symbol.to_string(), quote);
    }

    out
}

fn row_code(
    cells: &[String],
    layout: Option<ColumnLayout>,
    targets: &HashSet<String>,
) -> Option<String> {
    match layout.and_then(|l| cells.get(l.instrument)) {
        Some(instrument) => classify_row(std::slice::from_ref(instrument), targets),
        None => classify_row(cells, targets),
    }
}

fn row_quote(
    cells: &[String],
    layout: Option<ColumnLayout>,
    thresholds: &ExtractionThresholds,
) -> (Option<f64>, Option<f64>) {
    let values = numeric_values(&cells.join(" "));
    let column = |idx: usize| cells.get(idx).and_then(|c| parse_number(c));

    // The price is settled first so the percent fallback never hands it back.
    let last = layout
        .and_then(|l| column(l.last))
        .filter(|v| *v > thresholds.min_price_exclusive)
        .or_else(|| pick_price(&values, thresholds));
    let pct = layout
        .and_then(|l| l.percent)
        .and_then(column)
        .or_else(|| pick_percent(&values, last, thresholds));
    (last, pct)
}
