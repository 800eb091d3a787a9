//! Property-based tests for row normalization and errata.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p georoc --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=10000 cargo test -p georoc --test property_tests
//! ```

use indexmap::IndexMap;
use proptest::prelude::*;

use georoc::errata::Correction;
use georoc::record::{FieldMap, normalize_header, parse_citations, strip_citations};
use georoc::{Converter, FieldType, Sample, Value};

// =============================================================================
// Test Strategies
// =============================================================================

/// Cell text without brackets.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,/-]{0,30}"
}

/// Reference ids as they appear in markers.
fn reference_id() -> impl Strategy<Value = u32> {
    1u32..100_000
}

/// Field names in the style of GEOROC headers.
fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z]{2,12}",
        "[A-Z]{2,8}_[A-Z]{2,8}",
        "[A-Z]{1,4}[0-9]{1,3}\\([A-Z%]{2,4}\\)",
        "[A-Z]{1,4}[0-9]{1,3}_[A-Z]{1,4}[0-9]{1,3}",
        Just("MIN._AGE_(YRS.)".to_string()),
        Just("MAX._AGE_(YRS.)".to_string()),
        Just("LATITUDE_MIN".to_string()),
    ]
}

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (-1.0e6f64..1.0e6).prop_map(Value::Real),
        "[a-z]{0,10}".prop_map(Value::from),
    ]
}

// =============================================================================
// Citation Parser Properties
// =============================================================================

proptest! {
    #[test]
    fn strip_citations_removes_all_markers(
        text in plain_text(),
        ids in prop::collection::vec(reference_id(), 0..5),
    ) {
        let markers: String = ids.iter().map(|id| format!("[{}]", id)).collect();
        let (value, refs) = strip_citations(&format!("{}{}", text, markers));

        prop_assert_eq!(value, text.trim());
        for id in &ids {
            prop_assert!(refs.contains(&id.to_string()));
        }
        prop_assert!(refs.len() <= ids.len());
    }

    #[test]
    fn strip_citations_never_panics(input in "\\PC{0,100}") {
        let _ = strip_citations(&input);
    }

    #[test]
    fn citations_column_preserves_first_appearance(ids in prop::collection::vec(reference_id(), 0..8)) {
        let column: String = ids.iter().map(|id| format!("[{}]", id)).collect();
        let citations = parse_citations(&column).unwrap();

        let mut expected: Vec<String> = Vec::new();
        for id in &ids {
            if !expected.contains(&id.to_string()) {
                expected.push(id.to_string());
            }
        }
        let keys: Vec<String> = citations.keys().cloned().collect();
        prop_assert_eq!(keys, expected);
        prop_assert!(citations.values().all(|fields| fields.is_empty()));
    }

    #[test]
    fn citations_column_rejects_residual_text(
        ids in prop::collection::vec(reference_id(), 0..4),
        residue in "[a-zA-Z]{1,10}",
    ) {
        let column: String = ids.iter().map(|id| format!("[{}]", id)).collect();
        let input = format!("{}{}", column, residue);
        prop_assert!(parse_citations(&input).is_err());
    }
}

// =============================================================================
// Type Inference Properties
// =============================================================================

proptest! {
    #[test]
    fn field_type_is_deterministic(name in field_name()) {
        prop_assert_eq!(FieldType::of(&name), FieldType::of(&name));
    }

    #[test]
    fn parenthesized_names_are_numeric_except_ages(name in field_name()) {
        if name.contains('(') && !name.contains("_AGE_") {
            prop_assert_eq!(FieldType::of(&name), FieldType::Numeric);
        }
        if name.ends_with("_AGE_(YRS.)") {
            prop_assert_eq!(FieldType::of(&name), FieldType::Text);
        }
    }

    #[test]
    fn letters_only_names_are_text(name in "[A-Z]{1,10}(_[A-Z]{1,10})?") {
        prop_assert_eq!(FieldType::of(&name), FieldType::Text);
    }

    #[test]
    fn normalized_headers_have_no_spaces(header in "[A-Z]{1,8}( [A-Z]{1,8}){0,3}( \\((MAX|MIN)\\.\\))?") {
        let name = normalize_header(&header);
        prop_assert!(!name.contains(' '));
    }
}

// =============================================================================
// Errata Properties
// =============================================================================

proptest! {
    #[test]
    fn converters_are_idempotent(value in any_value()) {
        let fields = FieldMap::new();
        for converter in [Converter::Upper, Converter::Positive, Converter::Negative] {
            let once = converter.correct(&value, &fields, "f.csv");
            let twice = converter.correct(&once, &fields, "f.csv");
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn sign_converters_preserve_magnitude(v in -1.0e6f64..1.0e6) {
        let fields = FieldMap::new();
        let value = Value::Real(v);
        let positive = Converter::Positive.correct(&value, &fields, "f.csv");
        let negative = Converter::Negative.correct(&value, &fields, "f.csv");
        prop_assert_eq!(positive.as_f64().map(f64::abs), Some(v.abs()));
        prop_assert_eq!(negative.as_f64().map(f64::abs), Some(v.abs()));
        prop_assert!(positive.as_f64().is_some_and(|p| p.is_sign_positive()));
        prop_assert!(negative.as_f64().is_some_and(|n| n.is_sign_negative()));
    }
}

// =============================================================================
// Row Normalizer Properties
// =============================================================================

proptest! {
    #[test]
    fn cited_fields_are_recorded(
        id in reference_id(),
        value in -1000.0f64..1000.0,
    ) {
        let mut citations = IndexMap::new();
        citations.insert(id.to_string(), Vec::new());
        let mut fields = IndexMap::new();
        fields.insert("SIO2(WT%)".to_string(), format!("{} [{}]", value, id));

        let sample = Sample::new("S", "s", citations, fields).unwrap();
        prop_assert_eq!(sample.get("SIO2(WT%)"), &Value::Real(value));
        prop_assert_eq!(&sample.citations[&id.to_string()], &vec!["SIO2(WT%)".to_string()]);
    }

    #[test]
    fn undeclared_citations_fail(id in reference_id()) {
        let mut fields = IndexMap::new();
        fields.insert("ROCK_NAME".to_string(), format!("BASALT [{}]", id));
        prop_assert!(Sample::new("S", "s", IndexMap::new(), fields).is_err());
    }
}
