//! Ingestion settings.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GeorocError, Result};

/// Sections of the precompiled files that duplicate other sections.
pub const DEFAULT_EXCLUDED_SECTIONS: &[&str] = &["Minerals", "Rocks", "Inclusions"];

/// Settings controlling how source tables are read and which are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Sections skipped when iterating samples and references.
    pub excluded_sections: Vec<String>,
    /// A line starting with any of these ends the table body.
    pub body_terminators: Vec<String>,
    /// A line starting with this opens the reference list.
    pub references_marker: String,
    /// CSV field delimiter.
    pub delimiter: u8,
    /// CSV quote character.
    pub quote: u8,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            excluded_sections: DEFAULT_EXCLUDED_SECTIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            body_terminators: vec!["Abbreviations".to_string(), "References:".to_string()],
            references_marker: "References:".to_string(),
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GeorocError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            GeorocError::Config(format!("Failed to parse '{}': {}", path.display(), e))
        })
    }

    /// Replace the excluded sections.
    pub fn with_excluded_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sections = sections.into_iter().map(Into::into).collect();
        self
    }

    /// Use a different CSV delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Returns true if files of `section` are skipped.
    pub fn is_excluded(&self, section: &str) -> bool {
        self.excluded_sections.iter().any(|s| s == section)
    }

    /// Returns true if `line` ends the table body.
    pub fn ends_body(&self, line: &str) -> bool {
        self.body_terminators.iter().any(|t| line.starts_with(t.as_str()))
    }
}
