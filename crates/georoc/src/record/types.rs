//! Field values, header normalization and name-based type inference.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Header names collapsed into plain `_MAX`/`_MIN` suffixes.
///
/// Keys are given after spaces have been replaced by underscores.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("ELEVATION_(MAX.)", "ELEVATION_MAX"),
    ("ELEVATION_(MIN.)", "ELEVATION_MIN"),
    ("LATITUDE_(MAX.)", "LATITUDE_MAX"),
    ("LATITUDE_(MIN.)", "LATITUDE_MIN"),
    ("LONGITUDE_(MAX.)", "LONGITUDE_MAX"),
    ("LONGITUDE_(MIN.)", "LONGITUDE_MIN"),
];

/// Age fields whose values may be two slash-separated numbers,
/// e.g. `3480000000 / 3484000000`.
pub const TEXT_AGE_FIELDS: &[&str] = &["MIN._AGE_(YRS.)", "MAX._AGE_(YRS.)"];

/// Normalize a raw CSV header into a field name.
pub fn normalize_header(header: &str) -> String {
    let name = header.trim().replace(' ', "_");
    COLUMN_RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(name)
}

/// Storage type of a field, decided from its name alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text, stored as TEXT.
    Text,
    /// Measurements parsed as `f64`, stored as REAL.
    Numeric,
}

impl FieldType {
    /// Classify a normalized field name.
    pub fn of(name: &str) -> Self {
        if TEXT_AGE_FIELDS.contains(&name) {
            return FieldType::Text;
        }
        if COLUMN_RENAMES.iter().any(|(_, to)| *to == name) {
            return FieldType::Numeric;
        }
        if name.contains('(') {
            return FieldType::Numeric;
        }
        if name.contains('_') && name.chars().any(|c| c.is_ascii_digit()) {
            return FieldType::Numeric;
        }
        FieldType::Text
    }

    /// SQLite storage class for columns of this type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Numeric => "REAL",
        }
    }
}

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Real(f64),
    Text(String),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            _ => None,
        }
    }

    /// The text value, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Real(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}
