use crate::ingest::types::PageTable;
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {css:?}: {e:?}"))
}

/// Reads every `<table>` of an HTML document into header and row cell texts.
///
/// Rows are the `<tr>` elements holding at least one `<td>`; their cells are all `td` and
/// `th` children in document order. Headers come from `thead` when present, otherwise from
/// the first row made only of `th` cells.
pub fn parse_tables(html: &str) -> Result<Vec<PageTable>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;
    let td_sel = selector("td")?;
    let thead_th_sel = selector("thead th")?;

    let mut out = Vec::new();
    for table in document.select(&table_sel) {
        let mut headers: Vec<String> = table.select(&thead_th_sel).map(cell_text).collect();
        let mut rows = Vec::new();

        for tr in table.select(&row_sel) {
            let cells: Vec<String> = tr.select(&cell_sel).map(cell_text).collect();
            if cells.is_empty() {
                continue;
            }
            if tr.select(&td_sel).next().is_none() {
                if headers.is_empty() {
                    headers = cells;
                }
                continue;
            }
            rows.push(cells);
        }

        if !rows.is_empty() || !headers.is_empty() {
            out.push(PageTable { headers, rows });
        }
    }

    tracing::debug!(
        tables = out.len(),
        rows = out.iter().map(|t| t.rows.len()).sum::<usize>(),
        "parsed live-market tables"
    );
    Ok(out)
}

// Text fragments joined by a single space, like a browser's rendered cell.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
