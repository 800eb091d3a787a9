//! Createdb command - load the catalog into SQLite.

use std::path::PathBuf;

use colored::Colorize;
use georoc::{Georoc, LoadProgress, SourceFile};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar advanced once per loaded file.
struct FileProgress {
    bar: ProgressBar,
}

impl FileProgress {
    fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl LoadProgress for FileProgress {
    fn start(&self, files: usize) {
        self.bar.set_length(files as u64);
    }

    fn file_loaded(&self, file: &SourceFile, _samples: usize) {
        self.bar.set_message(file.name.clone());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn run(repos: PathBuf, force: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let georoc = Georoc::open(&repos)?;

    let missing = georoc.missing_files()?;
    if !missing.is_empty() {
        for file in &missing {
            eprintln!("{} {}", "missing:".red(), file.name);
        }
        return Err(format!("{} catalog files are missing or corrupt", missing.len()).into());
    }

    // Per-file log lines replace the bar in verbose mode.
    let summary = georoc.create_db(force, FileProgress::new(verbose))?;
    let repo = georoc.repository();

    println!("{} {}", "Created".green().bold(), repo.db_path().display());
    println!("  Files:      {}", summary.files.to_string().white());
    println!("  Columns:    {}", summary.columns.to_string().white());
    println!("  Samples:    {}", summary.samples.to_string().white());
    println!("  Duplicates: {}", summary.duplicates.to_string().dimmed());
    println!("  References: {}", summary.references.to_string().white());
    println!("  Citations:  {}", summary.citations.to_string().white());
    println!();
    println!("Corrections logged to {}", repo.errata_log_path().display());
    println!("File listing written to {}", repo.manifest_path().display());

    Ok(())
}
