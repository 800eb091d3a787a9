//! Fuzz target for citation marker parsing.

#![no_main]

use georoc::record::{parse_citations, strip_citations};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let (stripped, refs) = strip_citations(data);
    assert!(stripped.len() <= data.len());

    if let Ok(citations) = parse_citations(data) {
        assert_eq!(citations.len(), refs.len());
    }
});
