//! The `symbol,last,pct` CSV that carries quotes from the `scrape` step to the `report` step,
//! plus the optional full export of every matched page row.

use crate::domain::quote::{Quote, QuoteMap};
use crate::extract::{parse_number, MatchedRow};
use crate::ingest::types::PageTable;
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;

const HEADER: [&str; 3] = ["symbol", "last", "pct"];

pub fn write_quotes(path: &Path, quotes: &QuoteMap) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create quotes file {}", path.display()))?;
    write_quotes_to(file, quotes)
}

pub fn read_quotes(path: &Path) -> Result<QuoteMap> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open quotes file {}", path.display()))?;
    read_quotes_from(file)
}

/// Rows come out sorted by symbol; absent values are written as empty cells.
pub fn write_quotes_to<W: Write>(writer: W, quotes: &QuoteMap) -> Result<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(HEADER).context("write quotes header failed")?;
    for quote in quotes.values() {
        w.write_record([
            quote.symbol.clone(),
            fmt_cell(quote.last_price),
            fmt_cell(quote.percent_change),
        ])
        .with_context(|| format!("write quote row for {} failed", quote.symbol))?;
    }
    w.flush().context("flush quotes file failed")?;
    Ok(())
}

/// Cells go through the number parser, so a file holding the page's own `744,90` text
/// reads the same as one holding `744.9`. Unreadable cells become absent values.
pub fn read_quotes_from<R: Read>(reader: R) -> Result<QuoteMap> {
    let mut r = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut out = QuoteMap::new();
    for result in r.records() {
        let record = result.context("malformed quotes file row")?;
        let symbol = record.get(0).unwrap_or("").trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let last = record.get(1).and_then(parse_number);
        let pct = record.get(2).and_then(parse_number);

        if out.contains_key(&symbol) {
            tracing::debug!(%symbol, "duplicate symbol in quotes file; keeping first row");
            continue;
        }
        out.insert(symbol.clone(), Quote::new(symbol, last, pct));
    }
    Ok(out)
}

pub fn write_full_rows(path: &Path, rows: &[MatchedRow<'_>]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create full rows file {}", path.display()))?;
    write_full_rows_to(file, rows)
}

/// Writes `symbol` followed by every site column seen across the matched rows, in
/// first-seen order. Cells keep the page's own text; a row lacking a column gets an empty
/// cell. Columns without a header are named `col_<n>` by position.
pub fn write_full_rows_to<W: Write>(writer: W, rows: &[MatchedRow<'_>]) -> Result<()> {
    let row_columns: Vec<Vec<String>> = rows
        .iter()
        .map(|r| column_names(r.table, r.cells.len()))
        .collect();

    let mut columns: Vec<&str> = Vec::new();
    for name in row_columns.iter().flatten() {
        if !columns.contains(&name.as_str()) {
            columns.push(name);
        }
    }

    let mut w = csv::Writer::from_writer(writer);
    w.write_record(std::iter::once("symbol").chain(columns.iter().copied()))
        .context("write full rows header failed")?;
    for (row, names) in rows.iter().zip(&row_columns) {
        let cells = columns.iter().map(|col| {
            names
                .iter()
                .position(|n| n == col)
                .and_then(|i| row.cells.get(i))
                .map(String::as_str)
                .unwrap_or("")
        });
        w.write_record(std::iter::once(row.symbol).chain(cells))
            .with_context(|| format!("write full row for {} failed", row.symbol))?;
    }
    w.flush().context("flush full rows file failed")?;
    Ok(())
}

fn column_names(table: &PageTable, width: usize) -> Vec<String> {
    (0..width.max(table.headers.len()))
        .map(|i| {
            table
                .headers
                .get(i)
                .map(|h| h.trim())
                .filter(|h| !h.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("col_{}", i + 1))
        })
        .collect()
}

fn fmt_cell(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::watchlist::Watchlist;
    use crate::extract::matched_rows;

    #[test]
    fn writes_sorted_rows_with_empty_cells() {
        let mut quotes = QuoteMap::new();
        quotes.insert("SNEP".into(), Quote::new("SNEP", Some(744.9), Some(1.2)));
        quotes.insert("HPS".into(), Quote::new("HPS", None, None));

        let mut buf = Vec::new();
        write_quotes_to(&mut buf, &quotes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "symbol,last,pct\nHPS,,\nSNEP,744.9,1.2\n");
    }

    #[test]
    fn reads_locale_cells_and_tolerates_garbage() {
        let text = "symbol,last,pct\nsnep,\"744,90\",\"+1,20%\"\nIAM,n/a,\nTGCC,1020\nSNEP,1,2\n";
        let quotes = read_quotes_from(text.as_bytes()).unwrap();

        assert_eq!(quotes.len(), 3);
        assert_eq!(quotes["SNEP"], Quote::new("SNEP", Some(744.9), Some(1.2)));
        assert_eq!(quotes["IAM"], Quote::missing("IAM"));
        assert_eq!(quotes["TGCC"].last_price, Some(1020.0));
        assert_eq!(quotes["TGCC"].percent_change, None);
    }

    #[test]
    fn file_round_trip_keeps_values() {
        let dir = std::env::temp_dir().join(format!("casawatch-handoff-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quotes.csv");

        let mut quotes = QuoteMap::new();
        quotes.insert("IAM".into(), Quote::new("IAM", Some(109.5), Some(-0.35)));
        write_quotes(&path, &quotes).unwrap();
        let back = read_quotes(&path).unwrap();
        assert_eq!(back, quotes);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn full_rows_carry_every_site_column() {
        let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        let tables = vec![
            PageTable {
                headers: row(&["Instrument", "Dernier cours", "Variation en %"]),
                rows: vec![row(&["SNP", "480,00", "-1,24 %"]), row(&["ATW", "700,00", "+0,10 %"])],
            },
            PageTable {
                headers: row(&["Instrument", "Dernier cours", "Volume"]),
                rows: vec![row(&["IAM", "112,00", "250 000", "extra"])],
            },
        ];
        let watchlist = Watchlist::builtin().unwrap();
        let rows = matched_rows(&tables, &watchlist);

        let mut buf = Vec::new();
        write_full_rows_to(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "symbol,Instrument,Dernier cours,Variation en %,Volume,col_4\n\
             SNEP,SNP,\"480,00\",\"-1,24 %\",,\n\
             IAM,IAM,\"112,00\",,250 000,extra\n"
        );
    }

    #[test]
    fn full_rows_file_has_only_a_header_when_nothing_matched() {
        let mut buf = Vec::new();
        write_full_rows_to(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "symbol\n");
    }
}
