//! `INDEX.md`: a Markdown listing of the files loaded into the database.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{GeorocError, Result};
use crate::input::SourceFile;

/// Render the manifest for `files`, grouped by consecutive section.
pub fn render<'a, I>(files: I, excluded: &[String]) -> String
where
    I: IntoIterator<Item = &'a SourceFile>,
{
    let mut out = String::from("# Content\n\n");
    out.push_str("`georoc.sqlite` contains data from GEOROC's precompiled datasets as listed below.\n");
    if !excluded.is_empty() {
        let sections: Vec<String> = excluded.iter().map(|s| format!("\"{}\"", s)).collect();
        let _ = writeln!(
            out,
            "To avoid redundancy, files from the sections {} have been excluded.",
            sections.join(", ")
        );
    }
    out.push_str("Upon loading the data into SQLite, a couple of apparent errors have been corrected.\n");
    out.push_str("These corrections are listed in [errata.log](errata.log).\n");

    let mut section: Option<&str> = None;
    for file in files {
        if section != Some(file.section.as_str()) {
            let _ = write!(
                out,
                "\n## {}\n\n| File | Size (KB) | Last Actualization |\n| --- | ---:| --- |\n",
                file.section
            );
            section = Some(file.section.as_str());
        }
        let _ = writeln!(out, "| {} | {} | {} |", file.name, file.size_kb(), file.date);
    }
    out
}

/// Write the manifest to `path`.
pub fn write<'a, I>(path: impl AsRef<Path>, files: I, excluded: &[String]) -> Result<()>
where
    I: IntoIterator<Item = &'a SourceFile>,
{
    let path = path.as_ref();
    fs::write(path, render(files, excluded)).map_err(|e| GeorocError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
