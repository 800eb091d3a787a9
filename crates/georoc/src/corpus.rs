//! Deduplicated streams of samples and references over a whole catalog.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::slice;

use crate::catalog::Catalog;
use crate::config::IngestConfig;
use crate::errata::ErrataEngine;
use crate::error::{GeorocError, Result};
use crate::input::{Reference, References, Samples, SourceFile};
use crate::record::Sample;

/// A catalog viewed through the ingestion settings and correction set.
///
/// Each call to [`Corpus::samples`] or [`Corpus::references`] starts a fresh
/// pass with its own deduplication state.
pub struct Corpus<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    config: &'a IngestConfig,
    errata: &'a ErrataEngine,
}

impl<'a, C: Catalog + ?Sized> Corpus<'a, C> {
    pub fn new(catalog: &'a C, config: &'a IngestConfig, errata: &'a ErrataEngine) -> Self {
        Self {
            catalog,
            config,
            errata,
        }
    }

    /// Files not in an excluded section, in catalog order.
    pub fn included_files(&self) -> impl Iterator<Item = &'a SourceFile> + 'a {
        let config = self.config;
        self.catalog
            .files()
            .iter()
            .filter(move |file| !file.is_excluded(config))
    }

    /// Corrected samples paired with the first file that contains them.
    pub fn samples(&self) -> CorpusSamples<'a, C> {
        CorpusSamples {
            catalog: self.catalog,
            config: self.config,
            errata: self.errata,
            files: self.catalog.files().iter(),
            current: None,
            seen: HashSet::new(),
            failed: false,
        }
    }

    /// References, each id yielded once.
    pub fn references(&self) -> CorpusReferences<'a, C> {
        CorpusReferences {
            catalog: self.catalog,
            config: self.config,
            files: self.catalog.files().iter(),
            current: None,
            seen: ReferenceRegistry::new(),
            failed: false,
        }
    }
}

/// Tracks reference ids across files and rejects conflicting texts.
#[derive(Debug, Default)]
pub struct ReferenceRegistry {
    known: HashMap<u64, String>,
}

impl ReferenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reference` as read from `file`.
    ///
    /// Returns `Ok(true)` the first time an id is seen and `Ok(false)` when
    /// it repeats with identical text.
    pub fn register(&mut self, reference: &Reference, file: &str) -> Result<bool> {
        match self.known.get(&reference.id) {
            None => {
                self.known.insert(reference.id, reference.text.clone());
                Ok(true)
            }
            Some(known) if known == &reference.text => Ok(false),
            Some(known) => Err(GeorocError::ReferenceConflict {
                id: reference.id,
                file: file.to_string(),
                known: known.clone(),
                found: reference.text.clone(),
            }),
        }
    }

    /// Number of distinct ids registered.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.known.len()
    }
}

/// Iterator returned by [`Corpus::samples`].
pub struct CorpusSamples<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    config: &'a IngestConfig,
    errata: &'a ErrataEngine,
    files: slice::Iter<'a, SourceFile>,
    current: Option<(Samples<'a, Box<dyn BufRead>>, &'a SourceFile)>,
    seen: HashSet<String>,
    failed: bool,
}

impl<'a, C: Catalog + ?Sized> CorpusSamples<'a, C> {
    fn next_file(&mut self) -> Option<Result<()>> {
        loop {
            let file = self.files.next()?;
            if file.is_excluded(self.config) {
                tracing::debug!(file = %file.name, section = %file.section, "skipping excluded section");
                continue;
            }
            return Some(
                file.samples(self.catalog, self.config, self.errata)
                    .map(|samples| self.current = Some((samples, file))),
            );
        }
    }

    fn fail(&mut self, e: GeorocError) -> Option<Result<(Sample, &'a SourceFile)>> {
        self.failed = true;
        self.current = None;
        Some(Err(e))
    }
}

impl<'a, C: Catalog + ?Sized> Iterator for CorpusSamples<'a, C> {
    type Item = Result<(Sample, &'a SourceFile)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let Some((samples, file)) = self.current.as_mut() else {
                match self.next_file()? {
                    Ok(()) => continue,
                    Err(e) => return self.fail(e),
                }
            };
            let file: &'a SourceFile = *file;
            match samples.next() {
                Some(Ok(sample)) => {
                    if self.seen.insert(sample.id.clone()) {
                        return Some(Ok((sample, file)));
                    }
                    tracing::debug!(sample = %sample.id, file = %file.name, "skipping duplicate sample");
                }
                Some(Err(e)) => return self.fail(e),
                None => self.current = None,
            }
        }
    }
}

/// Iterator returned by [`Corpus::references`].
pub struct CorpusReferences<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    config: &'a IngestConfig,
    files: slice::Iter<'a, SourceFile>,
    current: Option<(References<Box<dyn BufRead>>, &'a SourceFile)>,
    seen: ReferenceRegistry,
    failed: bool,
}

impl<C: Catalog + ?Sized> CorpusReferences<'_, C> {
    fn next_file(&mut self) -> Option<Result<()>> {
        loop {
            let file = self.files.next()?;
            if file.is_excluded(self.config) {
                continue;
            }
            return Some(
                file.references(self.catalog, self.config)
                    .map(|references| self.current = Some((references, file))),
            );
        }
    }

    fn fail(&mut self, e: GeorocError) -> Option<Result<Reference>> {
        self.failed = true;
        self.current = None;
        Some(Err(e))
    }
}

impl<C: Catalog + ?Sized> Iterator for CorpusReferences<'_, C> {
    type Item = Result<Reference>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let Some((references, file)) = self.current.as_mut() else {
                match self.next_file()? {
                    Ok(()) => continue,
                    Err(e) => return self.fail(e),
                }
            };
            match references.next() {
                Some(Ok(reference)) => match self.seen.register(&reference, &file.name) {
                    Ok(true) => return Some(Ok(reference)),
                    Ok(false) => {}
                    Err(e) => return self.fail(e),
                },
                Some(Err(e)) => return self.fail(e),
                None => self.current = None,
            }
        }
    }
}
