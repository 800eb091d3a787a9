//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Georoc: load GEOROC precompiled CSV files into SQLite
#[derive(Parser)]
#[command(name = "georoc")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository directory (containing catalog.json and csv/)
    #[arg(long, global = true, default_value = ".")]
    pub repos: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the SQLite database, errata log and INDEX.md
    Createdb {
        /// Replace an existing database
        #[arg(long)]
        force: bool,
    },

    /// List the files in the catalog
    Ls {
        /// Count the samples of each file
        #[arg(long)]
        samples: bool,

        /// Count the references of each file
        #[arg(long)]
        references: bool,

        /// Only list files of this section
        #[arg(short, long)]
        section: Option<String>,

        /// Only list section names with file counts
        #[arg(long)]
        sections_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show row counts of the database tables
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse every included file and report corrections and malformed rows
    Check {
        /// Only check files whose name contains this text
        #[arg(short, long)]
        pattern: Option<String>,
    },
}
