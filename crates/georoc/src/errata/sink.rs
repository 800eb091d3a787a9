//! Destinations for the errata log.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{GeorocError, Result};
use crate::record::Value;

/// One correction actually applied to a sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field that was changed.
    pub field: String,
    /// Source file of the sample.
    pub file: String,
    /// Identifier of the sample.
    pub sample_id: String,
    /// Value before correction.
    pub old: Value,
    /// Value after correction.
    pub new: Value,
}

impl fmt::Display for FieldChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fixing {} in {} ({}): {} -> {}",
            self.field, self.file, self.sample_id, self.old, self.new
        )
    }
}

/// Receives every change made by the errata engine.
pub trait ErrataSink: Send + Sync {
    /// Record one change.
    fn record(&self, change: &FieldChange) -> Result<()>;

    /// Flush buffered output.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Emits each change as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrataSink for TracingSink {
    fn record(&self, change: &FieldChange) -> Result<()> {
        tracing::info!(
            target: "georoc::errata",
            field = %change.field,
            file = %change.file,
            sample = %change.sample_id,
            "{}",
            change
        );
        Ok(())
    }
}

/// Collects changes in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    changes: Mutex<Vec<FieldChange>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the changes recorded so far.
    pub fn changes(&self) -> Vec<FieldChange> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.changes.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrataSink for MemorySink {
    fn record(&self, change: &FieldChange) -> Result<()> {
        if let Ok(mut changes) = self.changes.lock() {
            changes.push(change.clone());
        }
        Ok(())
    }
}

/// Writes one line per change, e.g. to `errata.log`.
pub struct WriterSink<W: Write + Send> {
    label: PathBuf,
    writer: Mutex<W>,
}

impl WriterSink<BufWriter<File>> {
    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| GeorocError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            label: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            label: PathBuf::from("<errata log>"),
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and return the underlying writer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn io_error(&self, source: std::io::Error) -> GeorocError {
        GeorocError::Io {
            path: self.label.clone(),
            source,
        }
    }
}

impl<W: Write + Send> ErrataSink for WriterSink<W> {
    fn record(&self, change: &FieldChange) -> Result<()> {
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(writer, "{}", change).map_err(|e| self.io_error(e))
    }

    fn flush(&self) -> Result<()> {
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        writer.flush().map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> FieldChange {
        FieldChange {
            field: "LAND_OR_SEA".to_string(),
            file: "a.csv".to_string(),
            sample_id: "X1".to_string(),
            old: Value::from("land"),
            new: Value::from("LAND"),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(change().to_string(), "fixing LAND_OR_SEA in a.csv (X1): land -> LAND");
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.record(&change()).unwrap();
        assert_eq!(sink.changes(), vec![change()]);
    }

    #[test]
    fn test_writer_sink() {
        let sink = WriterSink::new(Vec::new());
        sink.record(&change()).unwrap();
        sink.record(&change()).unwrap();
        sink.flush().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("fixing LAND_OR_SEA"));
    }
}
