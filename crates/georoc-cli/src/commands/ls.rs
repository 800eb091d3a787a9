//! Ls command - list the catalog.

use std::collections::BTreeMap;
use std::path::PathBuf;

use colored::Colorize;
use georoc::{Catalog, ErrataEngine, Georoc, SourceFile};

/// Flags of the ls command.
pub struct Options {
    pub samples: bool,
    pub references: bool,
    pub section: Option<String>,
    pub sections_only: bool,
    pub json: bool,
}

pub fn run(repos: PathBuf, options: Options) -> Result<(), Box<dyn std::error::Error>> {
    let georoc = Georoc::open(&repos)?;
    let repo = georoc.repository();
    let config = repo.config();

    let files: Vec<&SourceFile> = repo
        .files()
        .iter()
        .filter(|f| options.section.as_ref().is_none_or(|s| &f.section == s))
        .collect();

    if options.sections_only {
        let mut sections: BTreeMap<&str, usize> = BTreeMap::new();
        for file in &files {
            *sections.entry(file.section.as_str()).or_default() += 1;
        }
        if options.json {
            println!("{}", serde_json::to_string_pretty(&sections)?);
        } else {
            for (section, count) in &sections {
                let label = if config.is_excluded(section) {
                    section.dimmed()
                } else {
                    section.white()
                };
                println!("{:<50} {:>5}", label, count);
            }
        }
        return Ok(());
    }

    // Counting only; corrections are irrelevant here.
    let errata = ErrataEngine::disabled();
    let mut rows = Vec::with_capacity(files.len());
    for file in &files {
        let samples = if options.samples {
            Some(count(file.samples(repo, config, &errata)?)?)
        } else {
            None
        };
        let references = if options.references {
            Some(count(file.references(repo, config)?)?)
        } else {
            None
        };
        rows.push((*file, samples, references));
    }

    if options.json {
        let listing: Vec<serde_json::Value> = rows
            .iter()
            .map(|(file, samples, references)| {
                serde_json::json!({
                    "filename": file.name,
                    "section": file.section,
                    "date": file.date.to_string(),
                    "size": file.size,
                    "excluded": file.is_excluded(config),
                    "samples": samples,
                    "references": references,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    for (file, samples, references) in &rows {
        let name = if file.is_excluded(config) {
            file.name.dimmed()
        } else {
            file.name.white()
        };
        let mut line = format!(
            "{:<60} {:<30} {} {:>8} KB",
            name,
            file.section,
            file.date,
            file.size_kb()
        );
        if let Some(n) = samples {
            line.push_str(&format!(" {:>8} samples", n));
        }
        if let Some(n) = references {
            line.push_str(&format!(" {:>6} refs", n));
        }
        println!("{}", line);
    }
    println!();
    println!("{} files", rows.len().to_string().cyan().bold());
    Ok(())
}

/// Count the items of a file view, failing on the first malformed row.
fn count<T>(mut items: impl Iterator<Item = georoc::Result<T>>) -> georoc::Result<usize> {
    items.try_fold(0, |n, item| item.map(|_| n + 1))
}
