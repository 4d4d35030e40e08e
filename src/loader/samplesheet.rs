//! Sample sheet parsing from spreadsheet workbooks

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use miette::Diagnostic;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Column, SampleRecord, SampleSheet};

/// The sample sheet could not be turned into records at all.
#[derive(Error, Debug, Diagnostic)]
pub enum ParseError {
    #[error("cannot read sample sheet {}", .path.display())]
    #[diagnostic(code(samplesheet::unreadable))]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a spreadsheet workbook", .path.display())]
    #[diagnostic(
        code(samplesheet::format),
        help("save the sample sheet as an Excel workbook (.xlsx)")
    )]
    NotAWorkbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("{} does not contain any worksheet", .path.display())]
    #[diagnostic(code(samplesheet::no_worksheet))]
    NoWorksheet { path: PathBuf },

    #[error("the first worksheet of {} has no header row", .path.display())]
    #[diagnostic(code(samplesheet::no_header))]
    MissingHeader { path: PathBuf },

    #[error(
        "{} is missing required column(s): {}",
        .path.display(),
        .columns.join(", ")
    )]
    #[diagnostic(
        code(samplesheet::missing_columns),
        help("column names are case-sensitive and must match the sample sheet template exactly")
    )]
    MissingColumns {
        path: PathBuf,
        columns: Vec<&'static str>,
    },
}

impl ParseError {
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Unreadable { path, .. }
            | ParseError::NotAWorkbook { path, .. }
            | ParseError::NoWorksheet { path }
            | ParseError::MissingHeader { path }
            | ParseError::MissingColumns { path, .. } => path,
        }
    }
}

/// Reads the first worksheet of a workbook into a [`SampleSheet`].
pub struct SampleSheetLoader;

impl SampleSheetLoader {
    /// Parse the workbook at `path`.
    ///
    /// The file is read into memory in one go, so no handle outlives this call
    /// regardless of the outcome.
    pub fn parse(path: &Path) -> Result<SampleSheet, ParseError> {
        let bytes = std::fs::read(path).map_err(|source| ParseError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::parse_workbook(path, bytes)
    }

    /// Parse workbook bytes. `path` is only used for messages.
    pub fn parse_workbook(path: &Path, bytes: Vec<u8>) -> Result<SampleSheet, ParseError> {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|source| {
                ParseError::NotAWorkbook {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ParseError::NoWorksheet {
                path: path.to_path_buf(),
            })?
            .map_err(|source| ParseError::NotAWorkbook {
                path: path.to_path_buf(),
                source,
            })?;

        // calamine ranges start at the first used cell, not at A1
        let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
        let rows = range
            .rows()
            .enumerate()
            .map(|(offset, cells)| (first_line + offset, cells.iter().map(cell_text).collect()));

        Self::from_rows(path, rows)
    }

    /// Build a sheet from already-stringified rows paired with their 1-based line numbers.
    pub fn from_rows<I>(path: &Path, rows: I) -> Result<SampleSheet, ParseError>
    where
        I: IntoIterator<Item = (usize, Vec<String>)>,
    {
        let mut rows = rows.into_iter().filter(|(_, cells)| !is_blank(cells));

        let (header_line, header) = rows.next().ok_or_else(|| ParseError::MissingHeader {
            path: path.to_path_buf(),
        })?;
        let columns = locate_columns(path, header_line, &header)?;

        let records = rows
            .enumerate()
            .map(|(idx, (line, cells))| {
                SampleRecord::from_lookup(idx + 1, line, |column| {
                    columns
                        .get(&column)
                        .and_then(|&position| cells.get(position))
                        .cloned()
                })
            })
            .collect::<Vec<_>>();

        debug!(
            "Parsed {} sample record(s) from {}",
            records.len(),
            path.display()
        );
        Ok(SampleSheet::new(records))
    }
}

fn locate_columns(
    path: &Path,
    header_line: usize,
    header: &[String],
) -> Result<HashMap<Column, usize>, ParseError> {
    let mut columns = HashMap::new();
    for (position, name) in header.iter().enumerate() {
        let Some(column) = Column::from_header(name) else {
            if !name.is_empty() {
                debug!("Ignoring extra column '{name}' on line {header_line}");
            }
            continue;
        };
        if columns.contains_key(&column) {
            warn!("Column '{column}' appears more than once; using the first occurrence");
            continue;
        }
        columns.insert(column, position);
    }

    let missing: Vec<&'static str> = Column::ALL
        .into_iter()
        .filter(|c| !columns.contains_key(c))
        .map(Column::header)
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    Ok(columns)
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

/// Render a cell the way it reads in the spreadsheet.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // Whole numbers typed into a cell come back as floats
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{documented_rows, header, write_workbook};
    use tempfile::TempDir;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn numbered(rows: Vec<Vec<String>>) -> Vec<(usize, Vec<String>)> {
        rows.into_iter().enumerate().map(|(i, r)| (i + 1, r)).collect()
    }

    #[test]
    fn test_from_rows_maps_columns_in_any_order() {
        let mut header = header();
        header.reverse();
        let mut row = documented_rows()[0].clone();
        row.reverse();

        let sheet = SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(vec![header, row]))
            .unwrap();
        assert_eq!(sheet.len(), 1);
        let record = &sheet.records()[0];
        assert_eq!(record.sample_id, "MIN-2020-000001");
        assert_eq!(record.barcode, "barcode01");
        assert_eq!(record.row, 1);
        assert_eq!(record.line, 2);
    }

    #[test]
    fn test_from_rows_ignores_extra_columns() {
        let mut header = header();
        header.insert(2, "Notes".to_string());
        let mut row = documented_rows()[1].clone();
        row.insert(2, "re-run of failed library".to_string());

        let sheet = SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(vec![header, row]))
            .unwrap();
        assert_eq!(sheet.records()[0].barcode, "barcode02");
        assert_eq!(sheet.records()[0].sample_name, documented_rows()[1][1]);
    }

    #[test]
    fn test_from_rows_reports_every_missing_column() {
        let header: Vec<String> = header()
            .into_iter()
            .filter(|h| h != "User" && h != "Barcode")
            .collect();

        let err = SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(vec![header]))
            .unwrap_err();
        match &err {
            ParseError::MissingColumns { columns, .. } => {
                assert_eq!(columns, &vec!["Barcode", "User"]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("Barcode, User"));
    }

    #[test]
    fn test_each_required_column_is_named_when_missing() {
        for column in Column::ALL {
            let position = header()
                .iter()
                .position(|h| h == column.header())
                .unwrap();
            let rows: Vec<Vec<String>> = std::iter::once(header())
                .chain(documented_rows())
                .map(|mut row| {
                    row.remove(position);
                    row
                })
                .collect();

            let err = SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(rows)).unwrap_err();
            match &err {
                ParseError::MissingColumns { columns, .. } => {
                    assert_eq!(columns, &vec![column.header()], "without {column}");
                }
                other => panic!("without {column}: unexpected error: {other}"),
            }
            assert!(err.to_string().ends_with(&format!(": {column}")));
        }
    }

    #[test]
    fn test_parse_names_missing_column_from_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.xlsx");
        let rows: Vec<Vec<String>> = std::iter::once(header())
            .chain(documented_rows())
            .map(|mut row| {
                row.remove(7);
                row
            })
            .collect();
        write_workbook(&path, &rows);

        let err = SampleSheetLoader::parse(&path).unwrap_err();
        assert!(err.to_string().contains("missing required column(s): Flowcell_Type"));
    }

    #[test]
    fn test_from_rows_column_names_are_case_sensitive() {
        let header: Vec<String> = header()
            .into_iter()
            .map(|h| if h == "User" { "user".to_string() } else { h })
            .collect();

        let err = SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(vec![header]))
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingColumns { ref columns, .. } if columns == &vec!["User"]));
    }

    #[test]
    fn test_from_rows_skips_blank_rows_but_keeps_line_numbers() {
        let rows = vec![
            (1, vec![String::new(); 3]),
            (2, header()),
            (3, documented_rows()[0].clone()),
            (4, vec![" ".to_string(); 11]),
            (5, documented_rows()[1].clone()),
        ];
        let sheet = SampleSheetLoader::from_rows(Path::new("s.xlsx"), rows).unwrap();
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.records()[1].row, 2);
        assert_eq!(sheet.records()[1].line, 5);
    }

    #[test]
    fn test_from_rows_short_rows_leave_fields_empty() {
        let row = strings(&["MIN-2020-000001", "Sample One"]);
        let sheet =
            SampleSheetLoader::from_rows(Path::new("s.xlsx"), numbered(vec![header(), row]))
                .unwrap();
        assert_eq!(sheet.records()[0].sample_name, "Sample One");
        assert_eq!(sheet.records()[0].user, "");
    }

    #[test]
    fn test_from_rows_without_header() {
        let err = SampleSheetLoader::from_rows(Path::new("s.xlsx"), Vec::new()).unwrap_err();
        assert!(matches!(err, ParseError::MissingHeader { .. }));
    }

    #[test]
    fn test_parse_reads_xlsx_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.xlsx");
        let mut rows = vec![header()];
        rows.extend(documented_rows());
        write_workbook(&path, &rows);

        let sheet = SampleSheetLoader::parse(&path).unwrap();
        assert_eq!(sheet.len(), 6);
        assert_eq!(sheet.records()[5].sample_id, "MIN-2020-000006");
        assert_eq!(sheet.records()[5].line, 7);
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SampleSheetLoader::parse(&dir.path().join("absent.xlsx")).unwrap_err();
        assert!(matches!(err, ParseError::Unreadable { .. }));
        assert!(err.path().ends_with("absent.xlsx"));
    }

    #[test]
    fn test_parse_rejects_delimited_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.csv");
        std::fs::write(&path, header().join(",")).unwrap();

        let err = SampleSheetLoader::parse(&path).unwrap_err();
        assert!(matches!(err, ParseError::NotAWorkbook { .. }));
    }

    #[test]
    fn test_cell_text_formats_numbers_like_the_sheet() {
        assert_eq!(cell_text(&Data::Float(7.0)), "7");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Bool(true)), "true");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
