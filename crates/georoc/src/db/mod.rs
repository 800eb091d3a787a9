//! Relational store: schema discovery, loading and read access.

mod loader;
pub mod manifest;
mod schema;

pub use loader::{Database, LoadProgress, LoadSummary, NoProgress, TableStats, discover_columns};
pub use schema::{Column, create_tables, discover, insert_sample_sql, quote_identifier, sample_table_sql};
