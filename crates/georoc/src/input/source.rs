//! Source file descriptors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::IngestConfig;

/// One precompiled CSV file as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name; the stable key for deduplication and errata lookups.
    #[serde(rename = "filename")]
    pub name: String,
    /// Section (compilation) the file belongs to.
    pub section: String,
    /// Date of the last update of the file.
    pub date: NaiveDate,
    /// File size in bytes.
    pub size: u64,
    /// Optional `sha256:<hex>` checksum of the file contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl SourceFile {
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        date: NaiveDate,
        size: u64,
    ) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            date,
            size,
            checksum: None,
        }
    }

    /// Attach a checksum.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Returns true if this file's section is skipped by `config`.
    pub fn is_excluded(&self, config: &IngestConfig) -> bool {
        config.is_excluded(&self.section)
    }

    /// Size in kilobytes, rounded.
    pub fn size_kb(&self) -> u64 {
        (self.size + 512) / 1024
    }
}
