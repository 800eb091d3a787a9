//! Check command - parse files without loading them.

use std::path::PathBuf;

use colored::Colorize;
use georoc::Georoc;

pub fn run(
    repos: PathBuf,
    pattern: Option<String>,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let georoc = Georoc::open(&repos)?;
    let repo = georoc.repository();
    let config = repo.config();
    // Corrections are reported through tracing as they are applied.
    let errata = georoc.errata()?;
    let corpus = georoc.corpus(&errata);

    let mut files = 0;
    let mut samples = 0;
    let mut references = 0;
    for file in corpus.included_files() {
        if let Some(pattern) = &pattern {
            if !file.name.contains(pattern.as_str()) {
                continue;
            }
        }
        let mut count = 0;
        for sample in file.samples(repo, config, &errata)? {
            sample?;
            count += 1;
        }
        let mut refs = 0;
        for reference in file.references(repo, config)? {
            reference?;
            refs += 1;
        }
        println!("{} {} ({} samples, {} references)", "ok".green(), file.name, count, refs);
        files += 1;
        samples += count;
        references += refs;
    }

    println!();
    println!(
        "{} {} files, {} samples, {} references",
        "Checked".cyan().bold(),
        files,
        samples,
        references
    );
    Ok(())
}
