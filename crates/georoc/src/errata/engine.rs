//! Engine that applies the correction set to normalized samples.

use std::sync::Arc;

use crate::error::Result;
use crate::record::{Sample, Value};

use super::corrections::{Corrections, coordinate_prefix};
use super::sink::{ErrataSink, FieldChange, TracingSink};

/// Applies documented corrections to samples before they enter the corpus.
pub struct ErrataEngine {
    corrections: Corrections,
    sink: Arc<dyn ErrataSink>,
}

impl ErrataEngine {
    /// Create an engine that logs changes through `tracing`.
    pub fn new(corrections: Corrections) -> Self {
        Self {
            corrections,
            sink: Arc::new(TracingSink),
        }
    }

    /// An engine without any rules.
    pub fn disabled() -> Self {
        Self::new(Corrections::new())
    }

    /// Send changes to `sink` instead.
    pub fn with_sink(mut self, sink: Arc<dyn ErrataSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The active correction set.
    pub fn corrections(&self) -> &Corrections {
        &self.corrections
    }

    /// Flush the sink.
    pub fn flush(&self) -> Result<()> {
        self.sink.flush()
    }

    /// Correct `sample`, read from `file`, in place.
    ///
    /// Named-field rules run first, then the coordinate rules registered
    /// for `file`. Null values are never passed to a correction. Returns the
    /// changes made, each of which has also been sent to the sink.
    pub fn apply(&self, sample: &mut Sample, file: &str) -> Result<Vec<FieldChange>> {
        let mut changes = Vec::new();

        for (field, correction) in self.corrections.fields() {
            let Some(old) = sample.data.get(field) else {
                continue;
            };
            if old.is_null() {
                continue;
            }
            let new = correction.correct(old, &sample.data, file);
            if &new != old {
                let change = self.change(sample, field, new.clone(), file);
                sample.data.insert(field.to_string(), new);
                changes.push(change);
            }
        }

        if self.corrections.has_coordinates(file) {
            for index in 0..sample.data.len() {
                let Some((field, old)) = sample.data.get_index(index) else {
                    continue;
                };
                if old.is_null() {
                    continue;
                }
                let Some(correction) = self.corrections.coordinate(file, &coordinate_prefix(field))
                else {
                    continue;
                };
                let new = correction.correct(old, &sample.data, file);
                if &new != old {
                    let field = field.clone();
                    let change = self.change(sample, &field, new.clone(), file);
                    if let Some((_, value)) = sample.data.get_index_mut(index) {
                        *value = new;
                    }
                    changes.push(change);
                }
            }
        }

        for change in &changes {
            self.sink.record(change)?;
        }
        Ok(changes)
    }

    fn change(&self, sample: &Sample, field: &str, new: Value, file: &str) -> FieldChange {
        FieldChange {
            field: field.to_string(),
            file: file.to_string(),
            sample_id: sample.id.clone(),
            old: sample.get(field).clone(),
            new,
        }
    }
}

impl Default for ErrataEngine {
    fn default() -> Self {
        Self::new(Corrections::builtin())
    }
}

impl std::fmt::Debug for ErrataEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrataEngine")
            .field("corrections", &self.corrections)
            .finish_non_exhaustive()
    }
}
