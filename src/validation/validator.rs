use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::error::{InvalidSampleSheet, Rule, Scope, ValidationError, ValidationResult, join_rows};
use super::rules;
use crate::loader::SampleSheetLoader;
use crate::models::{Column, SampleSheet};

/// Checks a sample sheet before anything is allowed to run against it.
///
/// Every rule is applied to every record and all violations are collected, so one pass
/// tells the operator everything that needs fixing.
pub struct SampleSheetValidator;

impl SampleSheetValidator {
    /// Apply all rules to a parsed sheet. Per-record rules come first, in record order,
    /// followed by the sheet-wide uniqueness checks.
    pub fn validate(sheet: &SampleSheet) -> ValidationResult {
        let mut errors = Vec::new();

        for record in sheet.records() {
            let scope = Scope::record(record);

            for column in Column::ALL {
                if record.get(column).trim().is_empty() {
                    errors.push(ValidationError::new(
                        scope.clone(),
                        Rule::MissingField,
                        Some(column),
                        format!("{column} is empty"),
                    ));
                }
            }

            if let Err(message) = rules::check_sample_id(&record.sample_id) {
                errors.push(ValidationError::new(
                    scope.clone(),
                    Rule::SampleIdFormat,
                    Some(Column::SampleId),
                    message,
                ));
            }

            if let Err(message) = rules::check_project_id(&record.project_id) {
                errors.push(ValidationError::new(
                    scope,
                    Rule::ProjectIdCharset,
                    Some(Column::ProjectId),
                    message,
                ));
            }
        }

        errors.extend(duplicates(sheet, Column::SampleId, Rule::DuplicateSampleId));
        errors.extend(duplicates(sheet, Column::Barcode, Rule::DuplicateBarcode));

        debug!(
            "Validated {} record(s), {} problem(s)",
            sheet.len(),
            errors.len()
        );
        ValidationResult::from_errors(errors)
    }

    /// Parse and validate the sheet at `path`. Never fails: a sheet that cannot be parsed
    /// yields a single sheet-level error.
    pub fn run(path: &Path) -> ValidationResult {
        match Self::check(path) {
            Ok(_) => ValidationResult::from_errors(Vec::new()),
            Err(result) => result,
        }
    }

    /// Parse and validate, handing back the sheet only when it passed.
    pub fn load(path: &Path) -> Result<SampleSheet, InvalidSampleSheet> {
        Self::check(path).map_err(|result| InvalidSampleSheet {
            path: path.to_path_buf(),
            errors: result.errors,
        })
    }

    fn check(path: &Path) -> Result<SampleSheet, ValidationResult> {
        info!("Validating sample sheet {}", path.display());
        let sheet = SampleSheetLoader::parse(path).map_err(|err| {
            debug!("Sample sheet did not parse: {err}");
            ValidationResult::from_errors(vec![ValidationError::from_parse_error(&err)])
        })?;

        let result = Self::validate(&sheet);
        if result.is_success() {
            Ok(sheet)
        } else {
            Err(result)
        }
    }
}

/// One sheet-level error per value shared by more than one record. Blank values are
/// left to the completeness check.
fn duplicates(sheet: &SampleSheet, column: Column, rule: Rule) -> Vec<ValidationError> {
    let mut order: Vec<&str> = Vec::new();
    let mut rows_by_value: HashMap<&str, Vec<usize>> = HashMap::new();

    for record in sheet.records() {
        let value = record.get(column).trim();
        if value.is_empty() {
            continue;
        }
        rows_by_value
            .entry(value)
            .or_insert_with(|| {
                order.push(value);
                Vec::new()
            })
            .push(record.row);
    }

    order
        .into_iter()
        .filter_map(|value| {
            let rows = rows_by_value.remove(value)?;
            (rows.len() > 1).then(|| {
                let message = format!("{column} '{value}' is used by rows {}", join_rows(&rows));
                ValidationError::new(Scope::Sheet { rows }, rule, Some(column), message)
            })
        })
        .collect()
}
