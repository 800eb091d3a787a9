//! Fuzz target for the file model.
//!
//! Sample and reference iteration must return errors, never panic, on
//! arbitrary bytes.

#![no_main]

use georoc::input::{References, Samples};
use georoc::{ErrataEngine, IngestConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    let config = IngestConfig::default();
    let errata = ErrataEngine::default();
    if let Ok(samples) = Samples::new(data, "fuzz.csv", &config, &errata) {
        for sample in samples {
            let _ = sample;
        }
    }
    for reference in References::new(data, "fuzz.csv", &config) {
        let _ = reference;
    }
});
