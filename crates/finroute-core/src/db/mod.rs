//! Document store for the data API
//!
//! SQLite-backed JSON records grouped into named collections, imported from
//! the dataset CSV files.

mod import;
mod records;
mod schema;

pub use import::parse_records;
pub use records::{Collection, Record, RecordQuery, SortDirection};
pub use schema::Database;
