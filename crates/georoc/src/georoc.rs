//! Main Georoc struct: a repository plus the operations run against it.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::{Catalog, Repository};
use crate::corpus::Corpus;
use crate::db::{Database, LoadProgress, LoadSummary, manifest};
use crate::errata::{ErrataEngine, WriterSink};
use crate::error::{GeorocError, Result};
use crate::input::SourceFile;

/// A local GEOROC mirror.
#[derive(Debug, Clone)]
pub struct Georoc {
    repo: Repository,
}

impl Georoc {
    /// Open the repository at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            repo: Repository::open(root)?,
        })
    }

    pub fn from_repository(repo: Repository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Handle to the repository's database.
    pub fn database(&self) -> Database {
        Database::new(self.repo.db_path())
    }

    /// Errata engine with the repository's correction rules, logging
    /// through `tracing`.
    pub fn errata(&self) -> Result<ErrataEngine> {
        Ok(ErrataEngine::new(self.repo.corrections()?))
    }

    /// Corpus view using `errata`.
    pub fn corpus<'a>(&'a self, errata: &'a ErrataEngine) -> Corpus<'a, Repository> {
        Corpus::new(&self.repo, self.repo.config(), errata)
    }

    /// Included catalog files whose CSV is missing or fails its checksum.
    ///
    /// Files in excluded sections are never read and are not checked.
    pub fn missing_files(&self) -> Result<Vec<&SourceFile>> {
        let config = self.repo.config();
        let mut missing = Vec::new();
        for file in self.repo.files().iter().filter(|f| !f.is_excluded(config)) {
            if !self.repo.exists(file)? {
                missing.push(file);
            }
        }
        Ok(missing)
    }

    /// Build `georoc.sqlite`, `errata.log` and `INDEX.md`.
    ///
    /// An existing database is only replaced when `force` is set.
    pub fn create_db(&self, force: bool, progress: impl LoadProgress + 'static) -> Result<LoadSummary> {
        let db = self.database().with_progress(progress);
        if db.exists() {
            if !force {
                return Err(GeorocError::Config(format!(
                    "database '{}' already exists, use --force to replace it",
                    db.path().display()
                )));
            }
            fs::remove_file(db.path()).map_err(|e| GeorocError::Io {
                path: db.path().to_path_buf(),
                source: e,
            })?;
        }

        let sink = WriterSink::create(self.repo.errata_log_path())?;
        let errata = ErrataEngine::new(self.repo.corrections()?).with_sink(Arc::new(sink));
        let summary = db.create(&self.repo, self.repo.config(), &errata)?;

        let config = self.repo.config();
        let corpus = Corpus::new(&self.repo, config, &errata);
        manifest::write(
            self.repo.manifest_path(),
            corpus.included_files(),
            &config.excluded_sections,
        )?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::db::NoProgress;

    fn setup() -> (TempDir, Georoc) {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("csv");
        fs::create_dir_all(&csv).unwrap();
        fs::write(
            csv.join("2023-06-TONGA.csv"),
            "UNIQUE_ID,SAMPLE NAME,CITATIONS,LATITUDE (MIN.),LAND OR SEA\n\
             T1,Tonga 1,[3],21.1,sea\n\
             References:\n\
             [3] Ewart 1977\n",
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let repo = Repository::new(
            dir.path(),
            vec![
                SourceFile::new("2023-06-TONGA.csv", "Convergent Margins", date, 120),
                SourceFile::new("absent.csv", "Rocks", date, 1),
            ],
        );
        repo.save_catalog().unwrap();
        let georoc = Georoc::open(dir.path()).unwrap();
        (dir, georoc)
    }

    #[test]
    fn test_create_db_writes_outputs() {
        let (dir, georoc) = setup();
        let summary = georoc.create_db(false, NoProgress).unwrap();
        assert_eq!(summary.samples, 1);

        assert!(dir.path().join("georoc.sqlite").exists());
        let index = fs::read_to_string(dir.path().join("INDEX.md")).unwrap();
        assert!(index.contains("| 2023-06-TONGA.csv | 0 | 2023-06-01 |"));
        assert!(!index.contains("absent.csv"));
        let log = fs::read_to_string(dir.path().join("errata.log")).unwrap();
        assert!(log.contains("LAND_OR_SEA"));
    }

    #[test]
    fn test_create_db_refuses_to_overwrite() {
        let (_dir, georoc) = setup();
        georoc.create_db(false, NoProgress).unwrap();
        assert!(matches!(georoc.create_db(false, NoProgress), Err(GeorocError::Config(_))));
        assert!(georoc.create_db(true, NoProgress).is_ok());
    }

    #[test]
    fn test_missing_files_ignore_excluded_sections() {
        let (_dir, georoc) = setup();
        assert!(georoc.missing_files().unwrap().is_empty());
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        Repository::new(
            dir.path(),
            vec![
                SourceFile::new("gone.csv", "Seamounts", date, 1),
                SourceFile::new("absent.csv", "Rocks", date, 1),
            ],
        )
        .save_catalog()
        .unwrap();
        let georoc = Georoc::open(dir.path()).unwrap();

        let missing = georoc.missing_files().unwrap();
        let names: Vec<&str> = missing.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["gone.csv"]);
    }
}
