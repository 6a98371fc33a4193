use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub category: String,
    pub buy_threshold: f64,
    pub sell_threshold: Option<f64>,
    /// Ticker codes as printed on the exchange page (e.g. `SNP` for SNEP).
    pub page_codes: Vec<String>,
}

/// Validated watchlist. Entries keep configuration order, which is the tie-break order of
/// the report.
#[derive(Debug, Clone)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
    aliases: BTreeMap<String, String>,
}

impl Watchlist {
    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    /// Uppercase page codes the row classifier should look for.
    pub fn target_codes(&self) -> HashSet<String> {
        self.aliases.keys().cloned().collect()
    }

    /// Maps a raw page code to the internal symbol label.
    pub fn symbol_for_code(&self, code: &str) -> Option<&str> {
        self.resolve_code(code).map(|(_, symbol)| symbol)
    }

    /// Like [`Self::symbol_for_code`], also returning the normalized page code.
    pub fn resolve_code(&self, code: &str) -> Option<(&str, &str)> {
        self.aliases
            .get_key_value(&code.trim().to_uppercase())
            .map(|(code, symbol)| (code.as_str(), symbol.as_str()))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read watchlist {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid watchlist {}", path.display()))
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let raw = serde_json::from_str::<WatchlistFile>(text)
            .context("watchlist is not valid JSON for the watchlist schema")?;
        raw.validate_and_into_watchlist()
    }

    /// The watchlist the job ships with when no file is configured.
    pub fn builtin() -> anyhow::Result<Self> {
        let raw = WatchlistFile {
            entries: vec![
                RawEntry::new("SNEP", "Pivot", 495.0, Some(610.0), &["SNP"]),
                RawEntry::new("IAM", "Dividende", 109.0, Some(130.0), &["IAM"]),
                RawEntry::new("HPS", "Pivot", 556.0, Some(675.0), &["HPS"]),
                RawEntry::new("TGCC", "Growth", 900.0, Some(980.0), &["TGC"]),
            ],
        };
        raw.validate_and_into_watchlist()
            .context("built-in watchlist is invalid")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchlistFile {
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEntry {
    pub symbol: String,
    #[serde(default)]
    pub category: String,
    pub buy: f64,
    #[serde(default)]
    pub sell: Option<f64>,
    #[serde(default)]
    pub codes: Vec<String>,
}

impl RawEntry {
    fn new(symbol: &str, category: &str, buy: f64, sell: Option<f64>, codes: &[&str]) -> Self {
        Self {
            symbol: symbol.to_string(),
            category: category.to_string(),
            buy,
            sell,
            codes: codes.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl WatchlistFile {
    pub fn validate_and_into_watchlist(self) -> anyhow::Result<Watchlist> {
        ensure!(!self.entries.is_empty(), "watchlist must contain at least one entry");

        let mut seen_symbols = BTreeSet::<String>::new();
        let mut aliases = BTreeMap::<String, String>::new();
        let mut entries = Vec::with_capacity(self.entries.len());

        for raw in self.entries {
            let entry = raw.validate_and_into_entry()?;
            ensure!(
                seen_symbols.insert(entry.symbol.clone()),
                "duplicate symbol: {}",
                entry.symbol
            );
            for code in &entry.page_codes {
                if let Some(other) = aliases.insert(code.clone(), entry.symbol.clone()) {
                    if other == entry.symbol {
                        continue;
                    }
                    bail!(
                        "page code {code} is claimed by both {other} and {}",
                        entry.symbol
                    );
                }
            }
            entries.push(entry);
        }

        Ok(Watchlist { entries, aliases })
    }
}

impl RawEntry {
    fn validate_and_into_entry(self) -> anyhow::Result<WatchlistEntry> {
        let symbol = self.symbol.trim().to_uppercase();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");

        ensure!(
            self.buy.is_finite() && self.buy > 0.0,
            "{symbol}: buy threshold must be a positive number (got {})",
            self.buy
        );
        if let Some(sell) = self.sell {
            ensure!(
                sell.is_finite() && sell > 0.0,
                "{symbol}: sell threshold must be a positive number (got {sell})"
            );
        }

        let mut page_codes: Vec<String> = self
            .codes
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        if page_codes.is_empty() {
            page_codes.push(symbol.clone());
        }
        for code in &page_codes {
            ensure!(
                !code.contains(char::is_whitespace),
                "{symbol}: page code must be a single token (got {code:?})"
            );
        }

        Ok(WatchlistEntry {
            category: self.category.trim().to_string(),
            buy_threshold: self.buy,
            sell_threshold: self.sell,
            page_codes,
            symbol,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_watchlist_maps_page_codes() {
        let w = Watchlist::builtin().unwrap();
        assert_eq!(w.entries().len(), 4);
        assert_eq!(w.symbol_for_code("SNP"), Some("SNEP"));
        assert_eq!(w.symbol_for_code("tgc"), Some("TGCC"));
        assert_eq!(w.symbol_for_code("TGCC"), None);
        assert_eq!(w.resolve_code(" snp "), Some(("SNP", "SNEP")));
        assert!(w.target_codes().contains("IAM"));
    }

    #[test]
    fn sell_and_codes_are_optional() {
        let v = json!({
            "entries": [
                {"symbol": "a", "category": "Growth", "buy": 100.0, "sell": 120.0},
                {"symbol": "B", "category": "Pivot", "buy": 50.0}
            ]
        });
        let w = Watchlist::from_json(&v.to_string()).unwrap();
        assert_eq!(w.entries()[0].symbol, "A");
        assert_eq!(w.entries()[0].page_codes, vec!["A".to_string()]);
        assert_eq!(w.entries()[1].sell_threshold, None);
        assert_eq!(w.symbol_for_code("B"), Some("B"));
    }

    #[test]
    fn rejects_missing_buy_threshold() {
        let v = json!({"entries": [{"symbol": "A", "category": "Growth", "sell": 120.0}]});
        assert!(Watchlist::from_json(&v.to_string()).is_err());
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let v = json!({
            "entries": [
                {"symbol": "A", "buy": 1.0},
                {"symbol": "a", "buy": 2.0}
            ]
        });
        let err = Watchlist::from_json(&v.to_string()).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate symbol"));
    }

    #[test]
    fn rejects_shared_page_codes() {
        let v = json!({
            "entries": [
                {"symbol": "A", "buy": 1.0, "codes": ["X"]},
                {"symbol": "B", "buy": 2.0, "codes": ["X"]}
            ]
        });
        assert!(Watchlist::from_json(&v.to_string()).is_err());
    }

    #[test]
    fn rejects_non_positive_thresholds() {
        let v = json!({"entries": [{"symbol": "A", "buy": 0.0}]});
        assert!(Watchlist::from_json(&v.to_string()).is_err());
        let v = json!({"entries": [{"symbol": "A", "buy": 10.0, "sell": -1.0}]});
        assert!(Watchlist::from_json(&v.to_string()).is_err());
    }

    #[test]
    fn rejects_empty_watchlist() {
        assert!(Watchlist::from_json(r#"{"entries": []}"#).is_err());
    }
}
