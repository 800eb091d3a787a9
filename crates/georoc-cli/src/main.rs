//! Georoc CLI - load GEOROC precompiled CSV files into SQLite.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Createdb { force } => commands::createdb::run(cli.repos, force, cli.verbose),

        Commands::Ls {
            samples,
            references,
            section,
            sections_only,
            json,
        } => commands::ls::run(
            cli.repos,
            commands::ls::Options {
                samples,
                references,
                section,
                sections_only,
                json,
            },
        ),

        Commands::Stats { json } => commands::stats::run(cli.repos, json),

        Commands::Check { pattern } => commands::check::run(cli.repos, pattern, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
