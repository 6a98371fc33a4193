pub mod handoff;
pub mod page;
pub mod table;
pub mod types;
