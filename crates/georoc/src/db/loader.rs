//! Streams the deduplicated corpus into SQLite.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OpenFlags, Transaction};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::IngestConfig;
use crate::corpus::{Corpus, ReferenceRegistry};
use crate::errata::ErrataEngine;
use crate::error::{GeorocError, Result};
use crate::input::SourceFile;
use crate::record::{Sample, Value};

use super::schema::{self, Column};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Observer notified while files are loaded.
pub trait LoadProgress {
    /// Loading starts; `files` files will be processed.
    fn start(&self, _files: usize) {}

    /// `file` has been loaded, contributing `samples` new samples.
    fn file_loaded(&self, _file: &SourceFile, _samples: usize) {}

    /// Loading finished.
    fn finish(&self) {}
}

/// Progress observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl LoadProgress for NoProgress {}

/// Counts collected during one load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Files loaded.
    pub files: usize,
    /// Data columns of the sample table.
    pub columns: usize,
    /// Distinct references.
    pub references: usize,
    /// Distinct samples.
    pub samples: usize,
    /// Samples skipped because an earlier file already contained them.
    pub duplicates: usize,
    /// Sample-reference links.
    pub citations: usize,
}

/// Row counts of the four tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableStats {
    pub files: u64,
    pub references: u64,
    pub samples: u64,
    pub citations: u64,
}

/// The relational store.
pub struct Database {
    path: PathBuf,
    progress: Box<dyn LoadProgress>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            progress: Box::new(NoProgress),
        }
    }

    /// Report loading progress to `progress`.
    pub fn with_progress(mut self, progress: impl LoadProgress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the schema and load every included file of `catalog`.
    ///
    /// The store is expected not to exist yet. All inserts run in one
    /// transaction with foreign keys enforced; any failure aborts the load.
    pub fn create<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        config: &IngestConfig,
        errata: &ErrataEngine,
    ) -> Result<LoadSummary> {
        let columns = discover_columns(catalog, config)?;
        tracing::info!(columns = columns.len(), "discovered sample columns");

        let mut conn = Connection::open(&self.path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let tx = conn.transaction()?;
        schema::create_tables(&tx, &columns)?;

        let mut summary = LoadSummary {
            columns: columns.len(),
            ..Default::default()
        };
        load(&tx, &columns, catalog, config, errata, &*self.progress, &mut summary)?;

        tx.commit()?;
        errata.flush()?;
        tracing::info!(
            files = summary.files,
            samples = summary.samples,
            references = summary.references,
            "database created at {}",
            self.path.display()
        );
        Ok(summary)
    }

    fn connect(&self) -> Result<Connection> {
        if !self.path.exists() {
            return Err(GeorocError::Io {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "database not found"),
            });
        }
        Ok(Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?)
    }

    /// Run a read-only query, returning each row as column name → value.
    pub fn query(&self, sql: &str) -> Result<Vec<IndexMap<String, serde_json::Value>>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt.query_map([], |row| {
            let mut map = IndexMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                map.insert(name.clone(), json_value(row.get_ref(i)?));
            }
            Ok(map)
        })?;
        let result = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(result)
    }

    /// Row counts of the four tables.
    pub fn stats(&self) -> Result<TableStats> {
        let conn = self.connect()?;
        let count = |table: &str| -> Result<u64> {
            let n: i64 = conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n.max(0) as u64)
        };
        Ok(TableStats {
            files: count("file")?,
            references: count("reference")?,
            samples: count("sample")?,
            citations: count("citation")?,
        })
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("path", &self.path).finish()
    }
}

fn json_value(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(v) => v.into(),
        ValueRef::Real(v) => serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned().into(),
        ValueRef::Blob(b) => b.to_vec().into(),
    }
}

/// Union of the field names of the first sample of each included file.
///
/// All rows of a file share its header, so one sample per file suffices.
pub fn discover_columns<C: Catalog + ?Sized>(catalog: &C, config: &IngestConfig) -> Result<Vec<Column>> {
    let errata = ErrataEngine::disabled();
    let corpus = Corpus::new(catalog, config, &errata);
    let mut names: Vec<String> = Vec::new();
    for file in corpus.included_files() {
        if let Some(sample) = file.samples(catalog, config, &errata)?.next().transpose()? {
            names.extend(sample.data.keys().cloned());
        }
    }
    Ok(schema::discover(names))
}

fn reference_key(id: &str) -> Result<i64> {
    id.parse::<i64>()
        .map_err(|_| GeorocError::InvalidReferenceId(id.to_string()))
}

fn load<C: Catalog + ?Sized>(
    tx: &Transaction<'_>,
    columns: &[Column],
    catalog: &C,
    config: &IngestConfig,
    errata: &ErrataEngine,
    progress: &dyn LoadProgress,
    summary: &mut LoadSummary,
) -> Result<()> {
    let corpus = Corpus::new(catalog, config, errata);
    let files: Vec<&SourceFile> = corpus.included_files().collect();

    let mut insert_file = tx.prepare("INSERT INTO file (id, date, section) VALUES (?1, ?2, ?3)")?;
    let mut insert_reference = tx.prepare("INSERT INTO reference (id, reference) VALUES (?1, ?2)")?;
    let mut insert_sample = tx.prepare(&schema::insert_sample_sql(columns))?;
    let mut insert_citation =
        tx.prepare("INSERT INTO citation (sample_id, reference_id, fields) VALUES (?1, ?2, ?3)")?;

    let mut references = ReferenceRegistry::new();
    let mut seen: HashSet<String> = HashSet::new();

    progress.start(files.len());
    for file in files {
        insert_file.execute((&file.name, file.date.to_string(), &file.section))?;

        for reference in file.references(catalog, config)? {
            let reference = reference?;
            if references.register(&reference, &file.name)? {
                let id = i64::try_from(reference.id)
                    .map_err(|_| GeorocError::InvalidReferenceId(reference.id.to_string()))?;
                insert_reference.execute((id, &reference.text))?;
            }
        }

        let mut loaded = 0;
        for sample in file.samples(catalog, config, errata)? {
            let sample = sample?;
            if !seen.insert(sample.id.clone()) {
                summary.duplicates += 1;
                continue;
            }
            insert_sample.execute(sample_params(&sample, &file.name, columns).as_slice())?;
            for (reference, fields) in &sample.citations {
                insert_citation.execute((&sample.id, reference_key(reference)?, fields.join(" ")))?;
                summary.citations += 1;
            }
            loaded += 1;
        }

        summary.files += 1;
        summary.samples += loaded;
        tracing::debug!(file = %file.name, samples = loaded, "loaded file");
        progress.file_loaded(file, loaded);
    }
    summary.references = references.len();
    progress.finish();
    Ok(())
}

fn sample_params<'s>(sample: &'s Sample, file: &'s String, columns: &[Column]) -> Vec<&'s dyn ToSql> {
    let mut params: Vec<&dyn ToSql> = Vec::with_capacity(columns.len() + 3);
    params.push(&sample.id);
    params.push(file);
    params.push(&sample.name);
    params.extend(columns.iter().map(|c| sample.get(&c.name) as &dyn ToSql));
    params
}
