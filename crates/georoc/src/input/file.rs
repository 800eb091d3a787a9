//! Read views over one source table: lines, samples and references.

use std::io::{self, BufRead};
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::IngestConfig;
use crate::errata::ErrataEngine;
use crate::error::{GeorocError, Result, RowError};
use crate::record::Sample;

use super::lines::{Lines, TableBody};
use super::source::SourceFile;

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(?P<id>[0-9]+)\]\s+(?P<text>.+)").unwrap());

/// A bibliographic reference from a file's reference list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: u64,
    pub text: String,
}

impl Reference {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

fn io_error(file: &str, source: io::Error) -> GeorocError {
    GeorocError::Io {
        path: PathBuf::from(file),
        source,
    }
}

impl SourceFile {
    /// Non-blank, trimmed lines of the file.
    pub fn lines<C: Catalog + ?Sized>(&self, catalog: &C) -> Result<Lines<Box<dyn BufRead>>> {
        Ok(Lines::new(catalog.open(self)?))
    }

    /// Samples from the table body, corrected by `errata`.
    pub fn samples<'e, C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        config: &IngestConfig,
        errata: &'e ErrataEngine,
    ) -> Result<Samples<'e, Box<dyn BufRead>>> {
        Samples::new(catalog.open(self)?, &self.name, config, errata)
    }

    /// References from the trailing reference list.
    pub fn references<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        config: &IngestConfig,
    ) -> Result<References<Box<dyn BufRead>>> {
        Ok(References::new(catalog.open(self)?, &self.name, config))
    }
}

type BodyReader<R> = csv::Reader<TableBody<R, Box<dyn FnMut(&str) -> bool>>>;

/// Iterator over the corrected samples of one file.
pub struct Samples<'e, R: BufRead> {
    reader: BodyReader<R>,
    headers: Vec<String>,
    record: csv::StringRecord,
    file: String,
    row: u64,
    errata: &'e ErrataEngine,
    failed: bool,
}

impl<'e, R: BufRead> Samples<'e, R> {
    /// Read samples of `file` from `reader`.
    pub fn new(reader: R, file: &str, config: &IngestConfig, errata: &'e ErrataEngine) -> Result<Self> {
        let settings = config.clone();
        let is_end: Box<dyn FnMut(&str) -> bool> = Box::new(move |line| settings.ends_body(line));
        let body = TableBody::new(Lines::new(reader), is_end);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter)
            .quote(config.quote)
            .has_headers(true)
            .flexible(true)
            .from_reader(body);
        let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
            file: file.to_string(),
            row: 1,
            errata,
            failed: false,
        })
    }

    fn malformed(&self, source: RowError) -> GeorocError {
        GeorocError::MalformedRow {
            file: self.file.clone(),
            row: self.row,
            source,
        }
    }

    fn read_sample(&mut self) -> Result<Option<Sample>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        self.row += 1;

        if self.record.len() != self.headers.len() {
            return Err(self.malformed(RowError::ColumnCount {
                expected: self.headers.len(),
                found: self.record.len(),
            }));
        }

        let mut sample = Sample::from_row(self.headers.iter().zip(self.record.iter()))
            .map_err(|e| self.malformed(e))?;
        self.errata.apply(&mut sample, &self.file)?;
        Ok(Some(sample))
    }
}

impl<R: BufRead> Iterator for Samples<'_, R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.read_sample() {
            Ok(sample) => sample.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Iterator over the reference list of one file.
pub struct References<R: BufRead> {
    lines: Lines<R>,
    file: String,
    marker: String,
    in_references: bool,
}

impl<R: BufRead> References<R> {
    pub fn new(reader: R, file: &str, config: &IngestConfig) -> Self {
        Self {
            lines: Lines::new(reader),
            file: file.to_string(),
            marker: config.references_marker.clone(),
            in_references: false,
        }
    }
}

/// Parse one line of a reference list.
///
/// The whole list is wrapped in double quotes in the source files, so one
/// leading and one trailing quote are removed first.
pub fn parse_reference_line(line: &str) -> Option<(String, String)> {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix('"') {
        line = rest.trim();
    }
    if let Some(rest) = line.strip_suffix('"') {
        line = rest.trim();
    }
    REFERENCE_PATTERN
        .captures(line)
        .map(|caps| (caps["id"].to_string(), caps["text"].to_string()))
}

impl<R: BufRead> Iterator for References<R> {
    type Item = Result<Reference>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(io_error(&self.file, e))),
            };
            if !self.in_references {
                self.in_references = line.starts_with(self.marker.as_str());
                continue;
            }
            if let Some((id, text)) = parse_reference_line(&line) {
                return Some(
                    id.parse::<u64>()
                        .map(|id| Reference::new(id, text))
                        .map_err(|_| GeorocError::InvalidReferenceId(id)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;

    const TABLE: &str = "UNIQUE_ID,SAMPLE NAME,CITATIONS,LATITUDE (MIN.),LAND OR SEA\n\
                         X1,Sample A,[1],-12.5,land\n\
                         \n\
                         X2,Sample B,[1][2],3.5 [2],SEA\n\
                         Abbreviations:\n\
                         n.d.,not determined\n\
                         References:\n\
                         \"[1] Smith 2020\n\
                         [2] Jones, A. (1999): Basalts.\"\n";

    #[test]
    fn test_samples() {
        let errata = ErrataEngine::default();
        let samples: Vec<Sample> =
            Samples::new(TABLE.as_bytes(), "t.csv", &IngestConfig::default(), &errata)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].id, "X1");
        assert_eq!(samples[0].get("LAND_OR_SEA"), &Value::from("LAND"));
        assert_eq!(samples[1].get("LATITUDE_MIN"), &Value::Real(3.5));
        assert_eq!(samples[1].citations["2"], vec!["LATITUDE_MIN"]);
    }

    #[test]
    fn test_references() {
        let refs: Vec<Reference> = References::new(TABLE.as_bytes(), "t.csv", &IngestConfig::default())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(
            refs,
            vec![
                Reference::new(1, "Smith 2020"),
                Reference::new(2, "Jones, A. (1999): Basalts."),
            ]
        );
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let table = TABLE.replace('\n', "\r");
        let config = IngestConfig::default();
        let errata = ErrataEngine::disabled();

        let samples = Samples::new(table.as_bytes(), "t.csv", &config, &errata)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(samples.len(), 2);

        let refs = References::new(table.as_bytes(), "t.csv", &config)
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], Reference::new(1, "Smith 2020"));
    }

    #[test]
    fn test_no_reference_section() {
        let refs: Vec<Reference> =
            References::new(&b"A,B\n1,2\n"[..], "t.csv", &IngestConfig::default())
                .collect::<Result<_>>()
                .unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_parse_reference_line() {
        assert_eq!(
            parse_reference_line("\"[12] Doe 2001\""),
            Some(("12".to_string(), "Doe 2001".to_string()))
        );
        assert_eq!(parse_reference_line("no reference here"), None);
        assert_eq!(parse_reference_line("[3]"), None);
    }

    #[test]
    fn test_column_count_mismatch_reports_row() {
        let data = "UNIQUE_ID,SAMPLE_NAME,CITATIONS\nX1,A,[1]\nX2,B\n";
        let errata = ErrataEngine::disabled();
        let result: Result<Vec<Sample>> =
            Samples::new(data.as_bytes(), "bad.csv", &IngestConfig::default(), &errata)
                .unwrap()
                .collect();

        match result {
            Err(GeorocError::MalformedRow { file, row, source }) => {
                assert_eq!(file, "bad.csv");
                assert_eq!(row, 3);
                assert_eq!(source, RowError::ColumnCount { expected: 3, found: 2 });
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_iteration_stops_after_error() {
        let data = "UNIQUE_ID,SAMPLE_NAME,CITATIONS\nX1,A,oops\nX2,B,[1]\n";
        let errata = ErrataEngine::disabled();
        let mut samples =
            Samples::new(data.as_bytes(), "bad.csv", &IngestConfig::default(), &errata).unwrap();
        assert!(matches!(samples.next(), Some(Err(GeorocError::MalformedRow { row: 2, .. }))));
        assert!(samples.next().is_none());
    }

    #[test]
    fn test_empty_body() {
        let errata = ErrataEngine::disabled();
        let mut samples =
            Samples::new(&b"References:\n[1] A\n"[..], "e.csv", &IngestConfig::default(), &errata)
                .unwrap();
        assert!(samples.next().is_none());
    }
}
