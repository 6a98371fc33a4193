//! Turning scraped table rows into quotes.
//!
//! Everything here is pure and never fails: text that cannot be read degrades to `None`
//! and is carried downstream as missing data.

pub mod number;
pub mod quote;
pub mod row;
pub mod table;

pub use number::parse_number;
pub use quote::{extract_quote, extract_quote_with, pick_percent, pick_price, ExtractionThresholds};
pub use row::classify_row;
pub use table::{matched_rows, quotes_from_tables, MatchedRow};
