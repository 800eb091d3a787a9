//! Georoc: normalize, correct and load GEOROC precompiled CSV exports.
//!
//! The precompiled files are semi-structured tables: a CSV body followed by
//! an abbreviations legend and a quoted reference list, with inline `[n]`
//! citation markers in data cells. This crate turns them into typed samples,
//! applies documented corrections, deduplicates the overlapping files and
//! loads the result into a normalized SQLite database.
//!
//! # Pipeline
//!
//! - **Row normalization** ([`record`]): headers, citation markers, field types
//! - **Errata** ([`errata`]): per-field and per-file coordinate corrections
//! - **File model** ([`input`]): lines, samples and references of one file
//! - **Corpus** ([`corpus`]): deduplicated streams across the catalog
//! - **Loader** ([`db`]): schema discovery and the four-table store
//!
//! # Example
//!
//! ```no_run
//! use georoc::{Georoc, NoProgress};
//!
//! let georoc = Georoc::open("repos").unwrap();
//! let summary = georoc.create_db(false, NoProgress).unwrap();
//!
//! println!("Samples: {}", summary.samples);
//! println!("References: {}", summary.references);
//! ```

pub mod catalog;
pub mod config;
pub mod corpus;
pub mod db;
pub mod errata;
pub mod error;
pub mod input;
pub mod record;

mod georoc;

pub use crate::georoc::Georoc;
pub use catalog::{Catalog, MemoryCatalog, Repository};
pub use config::IngestConfig;
pub use corpus::{Corpus, ReferenceRegistry};
pub use db::{Database, LoadProgress, LoadSummary, NoProgress, TableStats};
pub use errata::{Converter, Correction, Corrections, ErrataEngine, ErrataSink, FieldChange};
pub use error::{GeorocError, Result, RowError};
pub use input::{Reference, SourceFile};
pub use record::{FieldType, Sample, Value};
