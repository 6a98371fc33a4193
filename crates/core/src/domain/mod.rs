pub mod quote;
pub mod recommendation;
pub mod watchlist;
