use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    Unknown,
}

impl Signal {
    pub fn marker(self) -> &'static str {
        match self {
            Signal::Buy => "🟢",
            Signal::Sell => "🔴",
            Signal::Hold => "🟡",
            Signal::Unknown => "⚪",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
            Signal::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub signal: Signal,
    pub potential_percent: Option<f64>,
}

/// Compares the last price with the configured thresholds.
///
/// The buy threshold wins when both thresholds are crossed (a misconfigured entry with
/// `sell <= buy`). Potential is the projected move to the sell threshold and is only
/// defined for a positive price with a sell threshold configured.
pub fn recommend(
    last_price: Option<f64>,
    buy_threshold: f64,
    sell_threshold: Option<f64>,
) -> (Signal, Option<f64>) {
    let Some(last) = last_price else {
        return (Signal::Unknown, None);
    };

    let signal = if last <= buy_threshold {
        Signal::Buy
    } else if sell_threshold.is_some_and(|sell| last >= sell) {
        Signal::Sell
    } else {
        Signal::Hold
    };

    let potential = match sell_threshold {
        Some(sell) if last > 0.0 => Some((sell - last) / last * 100.0),
        _ => None,
    };

    (signal, potential)
}
