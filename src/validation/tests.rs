use super::*;
use crate::models::{Column, SampleRecord, SampleSheet};
use crate::test_support::{documented_sheet, documented_sheet_with, documented_workbook_rows, write_workbook};
use tempfile::TempDir;

// Column positions in the documented rows
const SAMPLE_ID: usize = 0;
const BARCODE: usize = 2;
const PROJECT_ID: usize = 8;
const USER: usize = 10;

#[test]
fn test_documented_sheet_is_valid() {
    let result = SampleSheetValidator::validate(&documented_sheet());
    assert!(result.success);
    assert!(result.errors.is_empty());
}

#[test]
fn test_two_digit_year_flags_only_that_row() {
    let sheet = documented_sheet_with(|rows| rows[2][SAMPLE_ID] = "MIN-19-000023".to_string());
    let result = SampleSheetValidator::validate(&sheet);

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.rule, Rule::SampleIdFormat);
    assert_eq!(error.field, Some(Column::SampleId));
    assert_eq!(error.scope, Scope::Row { row: 3, line: 4 });
    for row in [1, 2, 4, 5, 6] {
        assert!(result.errors_for_row(row).is_empty());
    }
}

#[test]
fn test_project_id_with_spaces_flags_that_row() {
    let sheet =
        documented_sheet_with(|rows| rows[4][PROJECT_ID] = "Chicken Nugget Project".to_string());
    let result = SampleSheetValidator::validate(&sheet);

    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.rule, Rule::ProjectIdCharset);
    assert_eq!(error.scope.rows(), vec![5]);
    assert!(error.message.contains("'Chicken Nugget Project'"));
}

#[test]
fn test_shared_barcode_is_one_sheet_level_error() {
    let sheet = documented_sheet_with(|rows| {
        rows[1][BARCODE] = "barcode07".to_string();
        rows[3][BARCODE] = "barcode07".to_string();
    });
    let result = SampleSheetValidator::validate(&sheet);

    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.rule, Rule::DuplicateBarcode);
    assert_eq!(error.scope, Scope::Sheet { rows: vec![2, 4] });
    assert_eq!(error.message, "Barcode 'barcode07' is used by rows 2, 4");
}

#[test]
fn test_duplicate_sample_id_still_reports_row_errors() {
    let sheet = documented_sheet_with(|rows| {
        rows[5][SAMPLE_ID] = rows[0][SAMPLE_ID].clone();
        rows[3][PROJECT_ID] = "Nugget!".to_string();
        rows[1][USER] = String::new();
    });
    let result = SampleSheetValidator::validate(&sheet);

    let rules: Vec<Rule> = result.errors.iter().map(|e| e.rule).collect();
    assert_eq!(
        rules,
        vec![
            Rule::MissingField,
            Rule::ProjectIdCharset,
            Rule::DuplicateSampleId
        ]
    );
    assert_eq!(result.errors[0].field, Some(Column::User));
    assert_eq!(result.errors[2].scope.rows(), vec![1, 6]);
}

#[test]
fn test_exactly_one_sample_id_error_per_bad_record() {
    let bad_ids = ["MIN-19-000023", "", "BMH-2018-000001", "MIN-2020-0000001", "MIN 2020 000001"];
    for bad in bad_ids {
        let sheet = documented_sheet_with(|rows| {
            rows[0][SAMPLE_ID] = bad.to_string();
            // Other fields in the same record are broken as well
            rows[0][PROJECT_ID] = "has space".to_string();
            rows[0][USER] = String::new();
        });
        let result = SampleSheetValidator::validate(&sheet);
        let sample_id_errors: Vec<_> = result
            .errors_for_rule(Rule::SampleIdFormat)
            .into_iter()
            .filter(|e| e.scope.rows() == vec![1])
            .collect();
        assert_eq!(sample_id_errors.len(), 1, "for Sample_ID {bad:?}");
    }
}

#[test]
fn test_every_field_is_checked_for_completeness() {
    // Blank rows are dropped by the loader, so build the record directly
    let sheet = SampleSheet::new(vec![SampleRecord::from_lookup(1, 2, |_| {
        Some("  ".to_string())
    })]);
    let result = SampleSheetValidator::validate(&sheet);
    let missing: Vec<Column> = result
        .errors_for_rule(Rule::MissingField)
        .iter()
        .filter_map(|e| e.field)
        .collect();
    assert_eq!(missing, Column::ALL.to_vec());
}

#[test]
fn test_blank_values_are_not_duplicates() {
    let sheet = documented_sheet_with(|rows| {
        rows[0][BARCODE] = String::new();
        rows[1][BARCODE] = String::new();
    });
    let result = SampleSheetValidator::validate(&sheet);
    assert!(result.errors_for_rule(Rule::DuplicateBarcode).is_empty());
    assert_eq!(result.errors_for_rule(Rule::MissingField).len(), 2);
}

#[test]
fn test_header_only_sheet_has_nothing_to_violate() {
    let sheet = documented_sheet_with(|rows| rows.clear());
    let result = SampleSheetValidator::validate(&sheet);
    assert!(result.success);
    assert!(result.errors.is_empty());
}

#[test]
fn test_run_on_header_only_workbook_is_valid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.xlsx");
    write_workbook(&path, &documented_workbook_rows()[..1]);

    let result = SampleSheetValidator::run(&path);
    assert!(result.success, "{}", render_plain(&result));
    assert!(SampleSheetValidator::load(&path).unwrap().is_empty());
}

#[test]
fn test_validate_is_idempotent() {
    let sheet = documented_sheet_with(|rows| {
        rows[2][SAMPLE_ID] = "MIN-19-000023".to_string();
        rows[3][BARCODE] = rows[4][BARCODE].clone();
    });
    let first = SampleSheetValidator::validate(&sheet);
    let second = SampleSheetValidator::validate(&sheet);
    assert_eq!(first, second);
}

#[test]
fn test_run_on_valid_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.xlsx");
    write_workbook(&path, &documented_workbook_rows());

    let result = SampleSheetValidator::run(&path);
    assert!(result.success, "{}", render_plain(&result));

    let sheet = SampleSheetValidator::load(&path).unwrap();
    assert_eq!(sheet.len(), 6);
}

#[test]
fn test_run_missing_user_column_is_single_sheet_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.xlsx");
    let rows: Vec<Vec<String>> = documented_workbook_rows()
        .into_iter()
        .map(|mut row| {
            row.truncate(USER);
            row
        })
        .collect();
    write_workbook(&path, &rows);

    let result = SampleSheetValidator::run(&path);
    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert_eq!(error.rule, Rule::UnparseableSheet);
    assert_eq!(error.scope, Scope::sheet());
    assert!(error.message.contains("missing required column(s): User"));
}

#[test]
fn test_run_unreadable_file_includes_cause() {
    let dir = TempDir::new().unwrap();
    let result = SampleSheetValidator::run(&dir.path().join("missing.xlsx"));
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].message.starts_with("cannot read sample sheet"));
    assert!(result.errors[0].message.contains(": "));
}

#[test]
fn test_load_reports_all_problems() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.xlsx");
    let mut rows = documented_workbook_rows();
    rows[3][SAMPLE_ID] = "MIN-19-000023".to_string();
    rows[5][PROJECT_ID] = "Chicken Nugget Project".to_string();
    write_workbook(&path, &rows);

    let err = SampleSheetValidator::load(&path).unwrap_err();
    assert_eq!(err.errors.len(), 2);
    assert!(err.to_string().contains("2 problem(s)"));
}
