use miette::Diagnostic;
use serde::Serialize;
use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::loader::ParseError;
use crate::models::{Column, SampleRecord};

/// The rule a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// The sheet could not be parsed at all.
    UnparseableSheet,
    MissingField,
    SampleIdFormat,
    ProjectIdCharset,
    DuplicateSampleId,
    DuplicateBarcode,
}

impl Rule {
    pub fn id(self) -> &'static str {
        match self {
            Rule::UnparseableSheet => "unparseable-sheet",
            Rule::MissingField => "missing-field",
            Rule::SampleIdFormat => "sample-id-format",
            Rule::ProjectIdCharset => "project-id-charset",
            Rule::DuplicateSampleId => "duplicate-sample-id",
            Rule::DuplicateBarcode => "duplicate-barcode",
        }
    }

    fn help(self) -> Option<&'static str> {
        match self {
            Rule::UnparseableSheet => None,
            Rule::MissingField => Some("every column must be filled in for every sample"),
            Rule::SampleIdFormat => {
                Some("Sample_ID must look like MIN-2020-000001: 'MIN', a 4-digit year, a 6-digit number")
            }
            Rule::ProjectIdCharset => {
                Some("use only letters, digits, '_' and '-' in Project_ID, e.g. Chicken_Nugget_Project")
            }
            Rule::DuplicateSampleId => Some("each sample needs its own Sample_ID"),
            Rule::DuplicateBarcode => Some("each barcode can only be assigned to one sample"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Where in the sheet a problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// Not tied to a single record. `rows` lists the records involved, if any.
    Sheet { rows: Vec<usize> },
    Row { row: usize, line: usize },
}

impl Scope {
    pub fn sheet() -> Self {
        Scope::Sheet { rows: Vec::new() }
    }

    pub fn record(record: &SampleRecord) -> Self {
        Scope::Row {
            row: record.row,
            line: record.line,
        }
    }

    /// Record ordinals this scope refers to.
    pub fn rows(&self) -> Vec<usize> {
        match self {
            Scope::Sheet { rows } => rows.clone(),
            Scope::Row { row, .. } => vec![*row],
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Sheet { rows } if rows.is_empty() => f.write_str("sheet"),
            Scope::Sheet { rows } => write!(f, "sheet (rows {})", join_rows(rows)),
            Scope::Row { row, line } => write!(f, "row {row} (line {line})"),
        }
    }
}

pub(crate) fn join_rows(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One violated rule.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{scope}: {message}")]
pub struct ValidationError {
    pub scope: Scope,
    pub rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Column>,
    pub message: String,
}

impl ValidationError {
    pub fn new(scope: Scope, rule: Rule, field: Option<Column>, message: impl Into<String>) -> Self {
        Self {
            scope,
            rule,
            field,
            message: message.into(),
        }
    }

    /// Collapse a parse failure, including its causes, into a sheet-level error.
    pub fn from_parse_error(err: &ParseError) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(Scope::sheet(), Rule::UnparseableSheet, None, message)
    }
}

impl Diagnostic for ValidationError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.rule.id()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.rule
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// Outcome of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub success: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            success: errors.is_empty(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Errors that mention record `row`, either directly or as part of a sheet-level finding.
    pub fn errors_for_row(&self, row: usize) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.scope.rows().contains(&row))
            .collect()
    }

    pub fn errors_for_rule(&self, rule: Rule) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.rule == rule).collect()
    }

    pub fn into_report(self, path: impl Into<PathBuf>) -> Result<(), InvalidSampleSheet> {
        if self.success {
            Ok(())
        } else {
            Err(InvalidSampleSheet {
                path: path.into(),
                errors: self.errors,
            })
        }
    }
}

/// Every problem found in a sample sheet, reported together.
#[derive(Error, Debug, Diagnostic)]
#[error(
    "sample sheet {} has {} problem(s); nothing was run",
    .path.display(),
    .errors.len()
)]
#[diagnostic(
    code(samplesheet::invalid),
    help("fix every problem listed below and run again")
)]
pub struct InvalidSampleSheet {
    pub path: PathBuf,
    #[related]
    pub errors: Vec<ValidationError>,
}
