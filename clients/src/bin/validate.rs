//! `antigone-validate` validates generated triple files against the ontology.
//!
//! Checks either one file or every `output.ttl` (and legacy
//! `triples_<a>_to_<b>.ttl`) under a productions directory, and reports
//! undeclared prefixes, domain and range violations, datatype mismatches and
//! functional-property conflicts.
//!
//! **Usage:**
//! ```
//! antigone-validate [--ontology <path>] [--file <path> | --productions-dir <path>]
//!                   [--verbose] [--format text|json] [--log-level <filter>]
//! ```
//!
//! Exits non-zero if any file has an error-severity diagnostic.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use antigone_validator::{
    render_json, render_text, run, Target, ValidatorConfig, DEFAULT_ONTOLOGY_PATH,
    DEFAULT_PRODUCTIONS_DIR,
};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Report output format.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Human-readable listing.
    Text,
    /// Machine-readable JSON, warnings included.
    Json,
}

/// Validate generated triple files against the ontology.
#[derive(Parser)]
#[command(
    name = "antigone-validate",
    about = "Validate generated Turtle triple files against the ontology"
)]
struct Args {
    /// Path to the ontology (default: Context/Ontology.ttl).
    #[arg(long, env = "ANTIGONE_ONTOLOGY", default_value = DEFAULT_ONTOLOGY_PATH)]
    ontology: PathBuf,

    /// Validate a single triple file.
    #[arg(long, conflicts_with = "productions_dir")]
    file: Option<PathBuf>,

    /// Validate every triple file under this directory (default: [PRODUCTIONS]).
    #[arg(long)]
    productions_dir: Option<PathBuf>,

    /// Also list warnings.
    #[arg(long, short)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log filter, e.g. `debug` or `antigone_validator=trace` (default: RUST_LOG, then warn).
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log filter: {level}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level.as_deref())?;

    let target = match (args.file, args.productions_dir) {
        (Some(file), _) => Target::File(file),
        (None, Some(dir)) => Target::Directory(dir),
        (None, None) => Target::Directory(PathBuf::from(DEFAULT_PRODUCTIONS_DIR)),
    };
    let config = ValidatorConfig {
        ontology: args.ontology,
        target,
        show_warnings: args.verbose,
    };

    let report = run(&config)?;

    match args.format {
        Format::Text => print!("{}", render_text(&report, config.show_warnings)),
        Format::Json => println!("{}", render_json(&report).context("Failed to render JSON")?),
    }

    let summary = report.summary();
    if summary.failed > 0 {
        eprintln!("Validation FAILED: {} file(s) with errors.", summary.failed);
        process::exit(1);
    }
    Ok(())
}
