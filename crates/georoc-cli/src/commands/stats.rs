//! Stats command - row counts of the database tables.

use std::path::PathBuf;

use colored::Colorize;
use georoc::Georoc;

pub fn run(repos: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let georoc = Georoc::open(&repos)?;
    let db = georoc.database();
    if !db.exists() {
        return Err(format!(
            "Database not found: {}\nRun 'georoc createdb' first.",
            db.path().display()
        )
        .into());
    }

    let stats = db.stats()?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{} {}", "Database".cyan().bold(), db.path().display());
    println!("  file:      {}", stats.files.to_string().white());
    println!("  reference: {}", stats.references.to_string().white());
    println!("  sample:    {}", stats.samples.to_string().white());
    println!("  citation:  {}", stats.citations.to_string().white());
    Ok(())
}
