//! Normalized sample records.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RowError;

use super::citation::{Citations, parse_citations, strip_citations};
use super::types::{FieldType, Value, normalize_header};

/// Column holding the corpus-wide sample identifier.
pub const ID_COLUMN: &str = "UNIQUE_ID";
/// Column holding the sample's display name.
pub const NAME_COLUMN: &str = "SAMPLE_NAME";
/// Column declaring all references cited anywhere in the row.
pub const CITATIONS_COLUMN: &str = "CITATIONS";

/// Normalized field name → typed value, in header order.
pub type FieldMap = IndexMap<String, Value>;

/// One normalized row of a GEOROC table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Identifier, unique across the whole corpus.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Reference id → fields citing it.
    pub citations: Citations,
    /// Measurements and descriptive fields.
    pub data: FieldMap,
}

impl Sample {
    /// Build a sample from a raw row keyed by the original CSV headers.
    pub fn from_row<I, K, V>(row: I) -> Result<Self, RowError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw: IndexMap<String, String> = IndexMap::new();
        for (header, value) in row {
            let name = normalize_header(header.as_ref());
            if name.is_empty() {
                continue;
            }
            raw.insert(name, value.into());
        }

        let mut take = |column: &str| {
            raw.shift_remove(column)
                .ok_or_else(|| RowError::MissingColumn(column.to_string()))
        };
        let id = take(ID_COLUMN)?;
        let name = take(NAME_COLUMN)?;
        let citations = parse_citations(&take(CITATIONS_COLUMN)?)?;

        Self::new(id, name, citations, raw)
    }

    /// Build a sample from already separated parts.
    ///
    /// Citation markers are stripped from every field and recorded against
    /// the declared references; values are then typed by field name.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mut citations: Citations,
        fields: IndexMap<String, String>,
    ) -> Result<Self, RowError> {
        let mut data = FieldMap::with_capacity(fields.len());

        for (field, raw) in fields {
            let (value, refs) = strip_citations(&raw);
            for reference in refs {
                let cited_by = citations.get_mut(&reference).ok_or_else(|| {
                    RowError::UndeclaredCitation {
                        field: field.clone(),
                        reference: reference.clone(),
                    }
                })?;
                cited_by.push(field.clone());
            }

            let typed = convert(&field, value)?;
            data.insert(field, typed);
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            citations,
            data,
        })
    }

    /// Get a field value, treating absent fields as null.
    pub fn get(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.data.get(field).unwrap_or(&NULL)
    }

    /// The geographic region, i.e. the first component of `LOCATION`.
    pub fn region(&self) -> &str {
        self.get("LOCATION")
            .as_str()
            .and_then(|loc| loc.split(" / ").next())
            .unwrap_or("")
    }
}

fn convert(field: &str, value: String) -> Result<Value, RowError> {
    if value.is_empty() {
        return Ok(Value::Null);
    }
    match FieldType::of(field) {
        FieldType::Text => Ok(Value::Text(value)),
        FieldType::Numeric => value
            .parse::<f64>()
            .map(Value::Real)
            .map_err(|_| RowError::InvalidNumber {
                field: field.to_string(),
                value,
            }),
    }
}
