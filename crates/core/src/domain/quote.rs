use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One run's snapshot of a security. `None` means the value could not be determined from
/// the page; it is never a stand-in for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub last_price: Option<f64>,
    pub percent_change: Option<f64>,
}

impl Quote {
    /// Builds a quote, dropping a last price that is not a finite positive number.
    pub fn new(symbol: impl Into<String>, last_price: Option<f64>, percent_change: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price: last_price.filter(|v| v.is_finite() && *v > 0.0),
            percent_change: percent_change.filter(|v| v.is_finite()),
        }
    }

    pub fn missing(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            last_price: None,
            percent_change: None,
        }
    }
}

/// Quotes keyed by internal symbol.
pub type QuoteMap = BTreeMap<String, Quote>;
