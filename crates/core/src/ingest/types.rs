use serde::{Deserialize, Serialize};

/// One `<table>` of the live-market page, reduced to cell texts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Column positions of a table whose headers name the instrument and last price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub instrument: usize,
    pub last: usize,
    pub percent: Option<usize>,
}

const INSTRUMENT_HEADERS: &[&str] = &["instrument", "valeur", "ticker"];
const LAST_HEADERS: &[&str] = &["dernier cours", "cours", "last"];
const PERCENT_HEADERS: &[&str] = &["variation en %", "var. %", "variation %", "% change"];

impl PageTable {
    pub fn column_layout(&self) -> Option<ColumnLayout> {
        let normalized: Vec<String> = self
            .headers
            .iter()
            .map(|h| h.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
            .collect();
        // Aliases are listed by preference, so "Dernier cours" beats a plain "Cours".
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|n| normalized.iter().position(|h| h == n))
        };

        Some(ColumnLayout {
            instrument: find(INSTRUMENT_HEADERS)?,
            last: find(LAST_HEADERS)?,
            percent: find(PERCENT_HEADERS),
        })
    }
}
