//! File catalogs: the ordered list of known source files and access to
//! their contents.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Cursor, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::config::IngestConfig;
use crate::errata::Corrections;
use crate::error::{GeorocError, Result};
use crate::input::SourceFile;

/// Ordered collection of source files.
pub trait Catalog {
    /// All files, in catalog order.
    fn files(&self) -> &[SourceFile];

    /// Open a file's raw (Windows-1252 encoded) contents.
    fn open(&self, file: &SourceFile) -> Result<Box<dyn BufRead>>;

    /// Look up a file by name.
    fn get(&self, name: &str) -> Option<&SourceFile> {
        self.files().iter().find(|f| f.name == name)
    }
}

/// A local mirror of the precompiled files.
///
/// ```text
/// repos/
/// ├── catalog.json    # list of files, see `SourceFile`
/// ├── csv/            # the CSV files themselves
/// ├── georoc.json     # optional `IngestConfig`
/// └── errata.json     # optional `CorrectionRules`
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    files: Vec<SourceFile>,
    config: IngestConfig,
}

impl Repository {
    pub const CATALOG_FILE: &'static str = "catalog.json";
    pub const CONFIG_FILE: &'static str = "georoc.json";
    pub const ERRATA_FILE: &'static str = "errata.json";
    pub const CSV_DIR: &'static str = "csv";
    pub const DB_FILE: &'static str = "georoc.sqlite";
    pub const ERRATA_LOG: &'static str = "errata.log";
    pub const MANIFEST_FILE: &'static str = "INDEX.md";

    /// Open a repository directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let catalog_path = root.join(Self::CATALOG_FILE);
        let file = File::open(&catalog_path).map_err(|e| GeorocError::Io {
            path: catalog_path.clone(),
            source: e,
        })?;
        let files: Vec<SourceFile> = serde_json::from_reader(BufReader::new(file))?;

        let config_path = root.join(Self::CONFIG_FILE);
        let config = if config_path.exists() {
            IngestConfig::load(&config_path)?
        } else {
            IngestConfig::default()
        };

        Ok(Self {
            root,
            files,
            config,
        })
    }

    /// A repository over `files` without reading a catalog from disk.
    pub fn new(root: impl AsRef<Path>, files: Vec<SourceFile>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            files,
            config: IngestConfig::default(),
        }
    }

    /// Write the catalog to `catalog.json`.
    pub fn save_catalog(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| GeorocError::Io {
            path: self.root.clone(),
            source: e,
        })?;
        let path = self.root.join(Self::CATALOG_FILE);
        let file = File::create(&path).map_err(|e| GeorocError::Io {
            path: path.clone(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.files)?;
        Ok(())
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.root.join(Self::CSV_DIR)
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(Self::DB_FILE)
    }

    pub fn errata_log_path(&self) -> PathBuf {
        self.root.join(Self::ERRATA_LOG)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(Self::MANIFEST_FILE)
    }

    /// Location of a file's contents.
    pub fn path_of(&self, file: &SourceFile) -> PathBuf {
        self.csv_dir().join(&file.name)
    }

    /// Correction rules: `errata.json` if present, the built-in rules otherwise.
    pub fn corrections(&self) -> Result<Corrections> {
        let path = self.root.join(Self::ERRATA_FILE);
        if path.exists() {
            Corrections::load(path)
        } else {
            Ok(Corrections::builtin())
        }
    }

    /// Whether a file is present and, if the catalog has a checksum for it,
    /// whether its contents match.
    pub fn exists(&self, file: &SourceFile) -> Result<bool> {
        let path = self.path_of(file);
        if !path.exists() {
            return Ok(false);
        }
        match &file.checksum {
            Some(expected) => Ok(&checksum(&path)? == expected),
            None => Ok(true),
        }
    }
}

impl Catalog for Repository {
    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn open(&self, file: &SourceFile) -> Result<Box<dyn BufRead>> {
        let path = self.path_of(file);
        let handle = File::open(&path).map_err(|e| {
            tracing::warn!(file = %file.name, "CSV file missing from mirror");
            GeorocError::Io {
                path: path.clone(),
                source: e,
            }
        })?;
        Ok(Box::new(BufReader::new(handle)))
    }
}

/// Compute the `sha256:<hex>` checksum of a file.
pub fn checksum(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| GeorocError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| GeorocError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    files: Vec<SourceFile>,
    contents: HashMap<String, Vec<u8>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file with its raw contents.
    pub fn with_file(mut self, file: SourceFile, contents: impl Into<Vec<u8>>) -> Self {
        self.contents.insert(file.name.clone(), contents.into());
        self.files.push(file);
        self
    }
}

impl Catalog for MemoryCatalog {
    fn files(&self) -> &[SourceFile] {
        &self.files
    }

    fn open(&self, file: &SourceFile) -> Result<Box<dyn BufRead>> {
        let contents = self
            .contents
            .get(&file.name)
            .ok_or_else(|| GeorocError::UnknownFile(file.name.clone()))?;
        Ok(Box::new(Cursor::new(contents.clone())))
    }
}
