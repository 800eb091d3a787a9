//! Correction functions and the rule set that maps fields and files to them.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{GeorocError, Result};
use crate::record::{FieldMap, Value};

/// A correction applied to one field value.
///
/// Receives the current value, the record's full field map for cross-field
/// context, and the name of the source file. Returns the corrected value,
/// which may be identical to the input.
pub trait Correction: Send + Sync {
    fn correct(&self, value: &Value, fields: &FieldMap, file: &str) -> Value;
}

impl<F> Correction for F
where
    F: Fn(&Value, &FieldMap, &str) -> Value + Send + Sync,
{
    fn correct(&self, value: &Value, fields: &FieldMap, file: &str) -> Value {
        self(value, fields, file)
    }
}

/// Built-in corrections, addressable by name in rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Converter {
    /// Uppercase text values.
    Upper,
    /// Force numeric values to be positive.
    Positive,
    /// Force numeric values to be negative.
    Negative,
}

impl Correction for Converter {
    fn correct(&self, value: &Value, _fields: &FieldMap, _file: &str) -> Value {
        match (self, value) {
            (Converter::Upper, Value::Text(s)) => Value::Text(s.to_uppercase()),
            (Converter::Positive, Value::Real(v)) => Value::Real(v.copysign(1.0)),
            (Converter::Negative, Value::Real(v)) => Value::Real(v.copysign(-1.0)),
            _ => value.clone(),
        }
    }
}

/// Serializable form of a correction set, as stored in `errata.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRules {
    /// Field name → converter.
    #[serde(default)]
    pub fields: IndexMap<String, Converter>,
    /// File name → coordinate prefix (`latitude`, `longitude`) → converter.
    #[serde(default)]
    pub coordinates: IndexMap<String, IndexMap<String, Converter>>,
}

impl CorrectionRules {
    /// Read rules from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GeorocError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            GeorocError::Config(format!(
                "Failed to parse correction rules '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// Known mis-signed coordinates in the precompiled files.
const COORDINATE_ERRATA: &[(&str, Option<Converter>, Option<Converter>)] = {
    use Converter::{Negative as N, Positive as P};
    &[
        ("Convergent_Margins_comp__BISMARCK_ARC_-_NEW_BRITAIN_ARC.csv", Some(N), Some(P)),
        ("Convergent_Margins_comp__IZU-BONIN_ARC.csv", Some(P), Some(P)),
        ("Convergent_Margins_comp__KERMADEC_ARC.csv", Some(N), None),
        ("Convergent_Margins_comp__LUZON_ARC.csv", None, Some(P)),
        ("Convergent_Margins_comp__MARIANA_ARC.csv", Some(P), Some(P)),
        // Some POYA TERRANE longitudes read -21.0 instead of 163.0; not fixable by sign.
        ("Convergent_Margins_comp__NEW_CALEDONIA.csv", Some(N), Some(P)),
        ("Convergent_Margins_comp__NEW_HEBRIDES_ARC_-_VANUATU_ARCHIPELAGO.csv", Some(N), Some(N)),
        ("Convergent_Margins_comp__NEW_ZEALAND.csv", Some(N), Some(P)),
        ("Convergent_Margins_comp__SOLOMON_ISLAND_ARC.csv", Some(N), Some(P)),
        ("Convergent_Margins_comp__SULAWESI_ARC.csv", None, Some(P)),
        ("Convergent_Margins_comp__TONGA_ARC.csv", Some(N), None),
        // Longitudes are positive except for TONGA ARC / FIJI ISLANDS and TONGA ARC / LAU BASIN.
        ("Convergent_Margins_comp__YAP_ARC.csv", Some(P), None),
        ("Ocean_Island_Groups_comp__AUSTRAL-COOK_ISLANDS.csv", Some(N), Some(N)),
        ("Ocean_Island_Groups_comp__CAROLINE_ISLANDS.csv", Some(P), Some(P)),
        ("Ocean_Island_Groups_comp__EASTER_SEAMOUNT_CHAIN_-_SALAS_Y_GOMEZ_RIDGE.csv", Some(N), Some(N)),
        ("Ocean_Island_Groups_comp__PITCAIRN-GAMBIER_CHAIN.csv", Some(N), Some(N)),
        ("Ocean_Island_Groups_comp__HAWAIIAN_ISLANDS_part1.csv", Some(P), Some(N)),
        ("Ocean_Island_Groups_comp__HAWAIIAN_ISLANDS_part2.csv", Some(P), Some(N)),
        ("Ocean_Island_Groups_comp__HAWAIIAN-EMPEROR_CHAIN.csv", Some(P), Some(N)),
        ("Ocean_Island_Groups_comp__HAWAIIAN_ARCH_VOLCANIC_FIELDS.csv", Some(P), Some(N)),
        ("Ocean_Island_Groups_comp__SOCIETY_ISLANDS.csv", Some(N), Some(N)),
        ("Seamounts_comp__s_SAMOAN_ISLANDS.csv", Some(N), Some(N)),
        ("Ocean_Island_Groups_comp__SAMOAN_ISLANDS.csv", Some(N), Some(N)),
    ]
};

type Rule = Arc<dyn Correction>;

/// The full set of corrections the errata engine applies.
#[derive(Clone, Default)]
pub struct Corrections {
    fields: IndexMap<String, Rule>,
    coordinates: IndexMap<String, IndexMap<String, Rule>>,
}

impl Corrections {
    /// An empty rule set; applying it never changes anything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in rules for the published GEOROC compilations.
    pub fn builtin() -> Self {
        let mut rules = CorrectionRules::default();
        rules.fields.insert("LAND_OR_SEA".to_string(), Converter::Upper);
        for (file, latitude, longitude) in COORDINATE_ERRATA {
            let entry = rules.coordinates.entry((*file).to_string()).or_default();
            if let Some(c) = latitude {
                entry.insert("latitude".to_string(), *c);
            }
            if let Some(c) = longitude {
                entry.insert("longitude".to_string(), *c);
            }
        }
        Self::from_rules(&rules)
    }

    /// Build a correction set from serialized rules.
    pub fn from_rules(rules: &CorrectionRules) -> Self {
        let mut corrections = Self::new();
        for (field, converter) in &rules.fields {
            corrections = corrections.with_field(field.clone(), *converter);
        }
        for (file, prefixes) in &rules.coordinates {
            for (prefix, converter) in prefixes {
                corrections = corrections.with_coordinate(file.clone(), prefix.clone(), *converter);
            }
        }
        corrections
    }

    /// Load rules from a JSON rule file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_rules(&CorrectionRules::load(path)?))
    }

    /// Add a correction applied to `field` wherever it is non-null.
    pub fn with_field(mut self, field: impl Into<String>, correction: impl Correction + 'static) -> Self {
        self.fields.insert(field.into(), Arc::new(correction));
        self
    }

    /// Add a correction for all fields of `file` whose prefix is `prefix`.
    ///
    /// The prefix is the lowercased text before a field name's first
    /// underscore, e.g. `latitude` for `LATITUDE_MIN`.
    pub fn with_coordinate(
        mut self,
        file: impl Into<String>,
        prefix: impl Into<String>,
        correction: impl Correction + 'static,
    ) -> Self {
        self.coordinates
            .entry(file.into())
            .or_default()
            .insert(prefix.into().to_lowercase(), Arc::new(correction));
        self
    }

    /// Named-field rules in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn Correction)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// The coordinate rule for `file` and `prefix`, if any.
    pub fn coordinate(&self, file: &str, prefix: &str) -> Option<&dyn Correction> {
        self.coordinates
            .get(file)
            .and_then(|rules| rules.get(prefix))
            .map(|rule| rule.as_ref())
    }

    /// Returns true if `file` has any coordinate rules.
    pub fn has_coordinates(&self, file: &str) -> bool {
        self.coordinates.contains_key(file)
    }

    /// Returns true if there are no rules at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.coordinates.is_empty()
    }
}

impl fmt::Debug for Corrections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corrections")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("coordinates", &self.coordinates.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// The prefix used to look up coordinate rules for a field name.
pub fn coordinate_prefix(field: &str) -> String {
    field.split('_').next().unwrap_or_default().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converters() {
        let fields = FieldMap::new();
        assert_eq!(
            Converter::Upper.correct(&Value::from("land"), &fields, "f.csv"),
            Value::from("LAND")
        );
        assert_eq!(
            Converter::Positive.correct(&Value::Real(-12.0), &fields, "f.csv"),
            Value::Real(12.0)
        );
        assert_eq!(
            Converter::Negative.correct(&Value::Real(12.0), &fields, "f.csv"),
            Value::Real(-12.0)
        );
    }

    #[test]
    fn test_converters_leave_other_types_alone() {
        let fields = FieldMap::new();
        assert_eq!(
            Converter::Upper.correct(&Value::Real(1.5), &fields, "f.csv"),
            Value::Real(1.5)
        );
        assert_eq!(
            Converter::Negative.correct(&Value::from("N"), &fields, "f.csv"),
            Value::from("N")
        );
        assert_eq!(Converter::Positive.correct(&Value::Null, &fields, "f.csv"), Value::Null);
    }

    #[test]
    fn test_sign_keeps_zero() {
        let fields = FieldMap::new();
        let v = Converter::Negative.correct(&Value::Real(0.0), &fields, "f.csv");
        assert_eq!(v.as_f64().map(f64::abs), Some(0.0));
    }

    #[test]
    fn test_coordinate_prefix() {
        assert_eq!(coordinate_prefix("LATITUDE_MIN"), "latitude");
        assert_eq!(coordinate_prefix("LONGITUDE"), "longitude");
        assert_eq!(coordinate_prefix("SIO2(WT%)"), "sio2(wt%)");
    }

    #[test]
    fn test_builtin_rules() {
        let c = Corrections::builtin();
        assert!(c.fields().any(|(f, _)| f == "LAND_OR_SEA"));
        assert!(c.coordinate("Convergent_Margins_comp__KERMADEC_ARC.csv", "latitude").is_some());
        assert!(c.coordinate("Convergent_Margins_comp__KERMADEC_ARC.csv", "longitude").is_none());
        assert!(!c.has_coordinates("unknown.csv"));
    }

    #[test]
    fn test_rules_from_json() {
        let rules: CorrectionRules = serde_json::from_str(
            r#"{"fields": {"LAND_OR_SEA": "upper"},
                "coordinates": {"a.csv": {"latitude": "negative"}}}"#,
        )
        .unwrap();
        let c = Corrections::from_rules(&rules);
        let fields = FieldMap::new();
        let rule = c.coordinate("a.csv", "latitude").unwrap();
        assert_eq!(rule.correct(&Value::Real(3.0), &fields, "a.csv"), Value::Real(-3.0));
    }

    #[test]
    fn test_unknown_converter_is_rejected() {
        let rules: std::result::Result<CorrectionRules, _> =
            serde_json::from_str(r#"{"fields": {"LAND_OR_SEA": "lower"}}"#);
        assert!(rules.is_err());
    }

    #[test]
    fn test_closure_correction() {
        let c = Corrections::new().with_field("ROCK_NAME", |v: &Value, _: &FieldMap, _: &str| {
            match v {
                Value::Text(s) => Value::Text(s.trim_end_matches('?').to_string()),
                other => other.clone(),
            }
        });
        let (_, rule) = c.fields().next().unwrap();
        assert_eq!(
            rule.correct(&Value::from("BASALT?"), &FieldMap::new(), "f.csv"),
            Value::from("BASALT")
        );
    }
}
