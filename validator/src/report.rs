//! Diagnostic types, per-file reports, and report rendering.

use std::fmt::Write as FmtWrite;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Fails the file.
    Error,
    /// Reported, but never fails the file.
    Warning,
}

/// What a diagnostic is about.
///
/// Declaration order is the tie-break order for diagnostics on the same line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticKind {
    /// The document is not valid Turtle; nothing else was checked.
    ParseError,
    /// The document could not be read.
    ReadError,
    /// An IRI lies outside every declared and implied namespace.
    UndeclaredPrefix,
    /// The predicate is not a property of the ontology.
    UndeclaredProperty,
    /// The subject's types do not meet the property's domain.
    DomainViolation,
    /// The object's types do not meet the property's range.
    RangeViolation,
    /// A literal's datatype is not among the property's range datatypes.
    DatatypeMismatch,
    /// A subject has no asserted type anywhere in the document.
    UntypedIndividual,
    /// A typed individual takes part in no relationship.
    IsolatedIndividual,
    /// A functional property has more than one distinct value for a subject.
    FunctionalCardinality,
}

impl DiagnosticKind {
    /// Severity every diagnostic of this kind carries.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UndeclaredProperty
            | DiagnosticKind::UntypedIndividual
            | DiagnosticKind::IsolatedIndividual => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A single finding in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Error or warning.
    pub severity: Severity,
    /// What was found.
    pub kind: DiagnosticKind,
    /// 1-based line, or 0 when the finding concerns the whole file.
    pub line: usize,
    /// Human-readable description.
    pub message: String,
    /// The subject or term the finding is about, in Turtle syntax.
    pub context: String,
}

impl Diagnostic {
    /// Creates a diagnostic with the kind's own severity.
    pub fn new(
        kind: DiagnosticKind,
        line: usize,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            line,
            message: message.into(),
            context: context.into(),
        }
    }

    /// Returns true if this diagnostic fails its file.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// All diagnostics for one document.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// The document that was validated.
    pub path: PathBuf,
    /// Diagnostics ordered by line, then kind.
    pub diagnostics: Vec<Diagnostic>,
}

impl FileReport {
    /// Creates a report for `path`.
    pub fn new(path: impl Into<PathBuf>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            path: path.into(),
            diagnostics,
        }
    }

    /// Returns true if no error-severity diagnostic is present.
    #[must_use]
    pub fn passed(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Error-severity diagnostics, in order.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    /// Warning-severity diagnostics, in order.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }

    /// Returns the count of error diagnostics.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns the count of warning diagnostics.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// Totals across a validation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Files validated.
    pub files: usize,
    /// Files without errors.
    pub passed: usize,
    /// Files with at least one error.
    pub failed: usize,
    /// Error diagnostics across all files.
    pub errors: usize,
    /// Warning diagnostics across all files.
    pub warnings: usize,
}

/// Aggregated reports from all validated documents.
#[derive(Debug, Default, Serialize)]
pub struct ValidationReport {
    /// One report per document, sorted by path.
    pub files: Vec<FileReport>,
}

impl ValidationReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a file report, keeping the reports sorted by path.
    pub fn push(&mut self, file: FileReport) {
        let at = self.files.partition_point(|f| f.path <= file.path);
        self.files.insert(at, file);
    }

    /// Looks up the report for `path`.
    #[must_use]
    pub fn file(&self, path: &Path) -> Option<&FileReport> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Computes the run totals.
    #[must_use]
    pub fn summary(&self) -> ValidationSummary {
        self.files
            .iter()
            .fold(ValidationSummary::default(), |mut sum, file| {
                sum.files += 1;
                if file.passed() {
                    sum.passed += 1;
                } else {
                    sum.failed += 1;
                }
                sum.errors += file.error_count();
                sum.warnings += file.warning_count();
                sum
            })
    }

    /// Returns true if every file passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.files.iter().all(FileReport::passed)
    }
}

/// Renders the report as text: per file a status line, its errors, then its
/// warnings when `show_warnings` is set, and a closing summary line.
#[must_use]
pub fn render_text(report: &ValidationReport, show_warnings: bool) -> String {
    let mut out = String::new();
    let rule = "=".repeat(70);

    let _ = writeln!(out, "Validating {} triple file(s)", report.files.len());
    let _ = writeln!(out, "{rule}");

    for file in &report.files {
        let path = file.path.display();
        let warnings = file.warning_count();
        if file.passed() {
            if warnings > 0 {
                let _ = writeln!(out, "[PASS] {path} ({warnings} warning(s))");
            } else {
                let _ = writeln!(out, "[PASS] {path}");
            }
        } else {
            let _ = writeln!(out, "[FAIL] {path} ({} error(s))", file.error_count());
        }
        for diag in file.errors() {
            let _ = writeln!(out, "       ERROR {}", format_entry(&file.path, diag));
        }
        if show_warnings {
            for diag in file.warnings() {
                let _ = writeln!(out, "       WARN  {}", format_entry(&file.path, diag));
            }
        }
    }

    let summary = report.summary();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Summary: {} file(s) checked, {} passed, {} failed; {} error(s), {} warning(s)",
        summary.files, summary.passed, summary.failed, summary.errors, summary.warnings
    );
    out
}

fn format_entry(path: &Path, diag: &Diagnostic) -> String {
    format!(
        "{}:{} [{:?}] {}",
        path.display(),
        diag.line,
        diag.kind,
        diag.message
    )
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: ValidationSummary,
}

/// Renders the report and its summary as pretty-printed JSON.
///
/// Warnings are always included.
///
/// # Errors
///
/// Returns an error if a path cannot be represented as JSON.
pub fn render_json(report: &ValidationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        files: &report.files,
        summary: report.summary(),
    })
}
