//! Errata: documented corrections applied to samples before loading.

mod corrections;
mod engine;
mod sink;

pub use corrections::{Converter, Correction, CorrectionRules, Corrections, coordinate_prefix};
pub use engine::ErrataEngine;
pub use sink::{ErrataSink, FieldChange, MemorySink, TracingSink, WriterSink};
