//! Inline `[n]` citation markers.

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RowError;

static CITATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?P<ref>[0-9]+)\]").unwrap());

/// Reference id → names of the fields citing it, in declaration order.
pub type Citations = IndexMap<String, Vec<String>>;

/// Strip all citation markers from `value`.
///
/// Returns the trimmed remainder and the distinct reference ids in order of
/// first appearance.
pub fn strip_citations(value: &str) -> (String, IndexSet<String>) {
    let mut refs = IndexSet::new();
    for caps in CITATION_PATTERN.captures_iter(value) {
        refs.insert(caps["ref"].to_string());
    }
    let stripped = CITATION_PATTERN.replace_all(value, "");
    (stripped.trim().to_string(), refs)
}

/// Parse a row's dedicated citations column.
///
/// The column must consist of markers only.
pub fn parse_citations(value: &str) -> Result<Citations, RowError> {
    let (rest, refs) = strip_citations(value);
    if !rest.is_empty() {
        return Err(RowError::CitationText(rest));
    }
    Ok(refs.into_iter().map(|id| (id, Vec::new())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_citations() {
        let (value, refs) = strip_citations("12.3[5][7]");
        assert_eq!(value, "12.3");
        assert_eq!(refs.len(), 2);
        assert!(refs.contains("5"));
        assert!(refs.contains("7"));
    }

    #[test]
    fn test_strip_citations_without_markers() {
        let (value, refs) = strip_citations("  BASALT ");
        assert_eq!(value, "BASALT");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_strip_citations_deduplicates() {
        let (value, refs) = strip_citations("[3] 0.5 [3]");
        assert_eq!(value, "0.5");
        assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn test_non_numeric_brackets_are_kept() {
        let (value, refs) = strip_citations("[a] 1");
        assert_eq!(value, "[a] 1");
        assert!(refs.is_empty());
    }

    #[test]
    fn test_parse_citations_column() {
        let citations = parse_citations("[1][2]").unwrap();
        assert_eq!(citations.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(citations.values().all(|fields| fields.is_empty()));
    }

    #[test]
    fn test_parse_citations_keeps_first_appearance_order() {
        let citations = parse_citations("[10] [2] [10]").unwrap();
        assert_eq!(citations.keys().collect::<Vec<_>>(), vec!["10", "2"]);
    }

    #[test]
    fn test_parse_citations_rejects_text() {
        assert_eq!(
            parse_citations("[1] see notes"),
            Err(RowError::CitationText("see notes".to_string()))
        );
    }

    #[test]
    fn test_parse_empty_citations() {
        assert!(parse_citations("").unwrap().is_empty());
    }
}
