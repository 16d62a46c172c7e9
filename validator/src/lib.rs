//! Ontology-constrained validation of generated triple documents.
//!
//! This crate loads an ontology once, then checks any number of Turtle data
//! documents against it and reports per-file diagnostics.
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Parse | [`antigone_ontology::parser`] |
//! | Build model (once) | [`antigone_ontology::OntologyModel`] |
//! | Index document | [`antigone_ontology::TripleStore`] |
//! | Check | [`checker`] |
//! | Report | [`report`] |
//!
//! A document that fails to parse gets a single `ParseError` diagnostic and
//! does not stop its siblings from being validated. An ontology that fails to
//! load aborts the run.
//!
//! # Entry Point
//!
//! ```no_run
//! use antigone_validator::{run, Target, ValidatorConfig};
//! use std::path::PathBuf;
//!
//! let config = ValidatorConfig {
//!     ontology: PathBuf::from("Context/Ontology.ttl"),
//!     target: Target::Directory(PathBuf::from("[PRODUCTIONS]")),
//!     show_warnings: false,
//! };
//! let report = run(&config).expect("Failed to run validation");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod checker;
pub mod discovery;
pub mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use antigone_ontology::{parse_document, OntologyModel, ParseError, TripleStore};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use report::{
    render_json, render_text, Diagnostic, DiagnosticKind, FileReport, Severity, ValidationReport,
    ValidationSummary,
};

/// Default ontology location, relative to the project root.
pub const DEFAULT_ONTOLOGY_PATH: &str = "Context/Ontology.ttl";

/// Default productions directory, relative to the project root.
pub const DEFAULT_PRODUCTIONS_DIR: &str = "[PRODUCTIONS]";

/// Failures that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The ontology file does not exist.
    #[error("ontology file not found: {0}")]
    OntologyNotFound(PathBuf),
    /// The ontology file is not valid Turtle.
    #[error("ontology {path} does not parse: {source}")]
    OntologyParse {
        /// The ontology file.
        path: PathBuf,
        /// The syntax error.
        source: ParseError,
    },
    /// The directory to scan does not exist.
    #[error("productions directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

/// What to validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One document.
    File(PathBuf),
    /// Every document discovered under a directory.
    Directory(PathBuf),
}

/// Settings for one validation run.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Where to load the ontology from.
    pub ontology: PathBuf,
    /// Single file or directory scan.
    pub target: Target,
    /// Whether warning diagnostics are rendered. They are always computed.
    pub show_warnings: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            ontology: PathBuf::from(DEFAULT_ONTOLOGY_PATH),
            target: Target::Directory(PathBuf::from(DEFAULT_PRODUCTIONS_DIR)),
            show_warnings: false,
        }
    }
}

/// Reads, parses and builds the ontology model.
///
/// # Errors
///
/// Returns [`RunError::OntologyNotFound`] or [`RunError::OntologyParse`], or
/// an I/O error if the file exists but cannot be read.
pub fn load_ontology(path: &Path) -> Result<OntologyModel> {
    if !path.exists() {
        return Err(RunError::OntologyNotFound(path.to_path_buf()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let doc = parse_document(&text).map_err(|source| RunError::OntologyParse {
        path: path.to_path_buf(),
        source,
    })?;
    let model = OntologyModel::from_document(&doc);
    info!(
        path = %path.display(),
        classes = model.class_count(),
        properties = model.property_count(),
        "ontology loaded"
    );
    Ok(model)
}

/// Validates document text already in memory.
///
/// A syntax error yields a report with exactly one `ParseError` diagnostic.
#[must_use]
pub fn validate_source(path: impl Into<PathBuf>, text: &str, model: &OntologyModel) -> FileReport {
    let path = path.into();
    let doc = match parse_document(text) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(path = %path.display(), line = err.line, "document does not parse: {}", err.kind);
            let diagnostic = Diagnostic::new(
                DiagnosticKind::ParseError,
                err.line,
                format!("syntax error: {}", err.kind),
                String::new(),
            );
            return FileReport::new(path, vec![diagnostic]);
        }
    };
    let store = TripleStore::from_statements(doc.statements);
    let diagnostics = checker::check(&store, model, &doc.prefixes);
    let report = FileReport::new(path, diagnostics);
    debug!(
        path = %report.path.display(),
        triples = store.len(),
        errors = report.error_count(),
        warnings = report.warning_count(),
        "document checked"
    );
    report
}

/// Reads and validates one document.
///
/// An unreadable file yields a report with one `ReadError` diagnostic.
#[must_use]
pub fn validate_file(path: &Path, model: &OntologyModel) -> FileReport {
    match std::fs::read_to_string(path) {
        Ok(text) => validate_source(path, &text, model),
        Err(err) => {
            warn!(path = %path.display(), "document cannot be read: {err}");
            FileReport::new(
                path,
                vec![Diagnostic::new(
                    DiagnosticKind::ReadError,
                    0,
                    format!("cannot read file: {err}"),
                    String::new(),
                )],
            )
        }
    }
}

/// Validates every path against the same model. Reports come back sorted by
/// path regardless of input order.
#[must_use]
pub fn validate_files<P: AsRef<Path>>(paths: &[P], model: &OntologyModel) -> ValidationReport {
    let mut report = ValidationReport::new();
    for path in paths {
        report.push(validate_file(path.as_ref(), model));
    }
    report
}

/// Runs a full validation: loads the ontology once, resolves the target to
/// document paths, and validates each of them.
///
/// # Errors
///
/// Returns an error if the ontology cannot be loaded or the target directory
/// does not exist. Per-document failures are reported, not returned.
pub fn run(config: &ValidatorConfig) -> Result<ValidationReport> {
    let model = load_ontology(&config.ontology)?;
    let paths = match &config.target {
        Target::File(path) => vec![path.clone()],
        Target::Directory(dir) => discovery::discover(dir)?,
    };
    if paths.is_empty() {
        warn!("no triple documents found to validate");
    }
    let report = validate_files(&paths, &model);
    let summary = report.summary();
    info!(
        files = summary.files,
        passed = summary.passed,
        failed = summary.failed,
        "validation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONTOLOGY: &str = "@prefix : <http://example.org/antigone#> .\n\
        @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
        :Character a owl:Class .\n";

    fn model() -> OntologyModel {
        parse_document(ONTOLOGY)
            .map(|doc| OntologyModel::from_document(&doc))
            .unwrap_or_else(|e| panic!("fixture does not parse: {e}"))
    }

    #[test]
    fn parse_error_is_the_only_diagnostic() {
        let report = validate_source(
            "output.ttl",
            "@prefix : <http://example.org/antigone#> .\n:Antigone :says \"unfinished .\n:Mystery :p :q .\n",
            &model(),
        );
        assert!(!report.passed());
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ParseError);
        assert_eq!(report.diagnostics[0].line, 2);
    }

    #[test]
    fn unreadable_file_fails() {
        let report = validate_file(Path::new("/nonexistent/output.ttl"), &model());
        assert!(!report.passed());
        assert_eq!(report.diagnostics[0].kind, DiagnosticKind::ReadError);
    }

    #[test]
    fn missing_ontology_aborts() {
        let err = load_ontology(Path::new("/nonexistent/Ontology.ttl"));
        assert!(matches!(
            err.map_err(|e| e.downcast::<RunError>()),
            Err(Ok(RunError::OntologyNotFound(_)))
        ));
    }
}
