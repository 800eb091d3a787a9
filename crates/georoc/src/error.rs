//! Error types for the georoc library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for georoc operations.
#[derive(Debug, Error)]
pub enum GeorocError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A data row could not be normalized. Aborts the whole run.
    #[error("{file}:{row}: {source}")]
    MalformedRow {
        file: String,
        row: u64,
        #[source]
        source: RowError,
    },

    /// The same reference id maps to different citation texts.
    #[error("Reference [{id}] in '{file}' conflicts with an earlier definition: '{known}' != '{found}'")]
    ReferenceConflict {
        id: u64,
        file: String,
        known: String,
        found: String,
    },

    /// A reference id that does not fit the store's integer key.
    #[error("Invalid reference id: {0}")]
    InvalidReferenceId(String),

    /// File name not present in the catalog.
    #[error("Unknown file: {0}")]
    UnknownFile(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the relational store.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Problems with a single row, reported without file context.
///
/// [`GeorocError::MalformedRow`] attaches the file name and row number.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    /// One of the dedicated columns is missing from the header.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// The row has a different number of cells than the header.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// The citations column contains something other than `[n]` markers.
    #[error("citations column contains non-citation text: '{0}'")]
    CitationText(String),

    /// A field cites a reference the row's citations column does not declare.
    #[error("field '{field}' cites undeclared reference [{reference}]")]
    UndeclaredCitation { field: String, reference: String },

    /// A numeric field holds something that is not a number.
    #[error("field '{field}' is numeric but holds '{value}'")]
    InvalidNumber { field: String, value: String },
}

/// Result type alias for georoc operations.
pub type Result<T> = std::result::Result<T, GeorocError>;
