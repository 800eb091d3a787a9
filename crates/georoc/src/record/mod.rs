//! Row normalization: citation markers, field typing and sample records.

mod citation;
mod sample;
mod types;

pub use citation::{Citations, parse_citations, strip_citations};
pub use sample::{CITATIONS_COLUMN, FieldMap, ID_COLUMN, NAME_COLUMN, Sample};
pub use types::{COLUMN_RENAMES, FieldType, TEXT_AGE_FIELDS, Value, normalize_header};
