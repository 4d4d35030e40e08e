//! Fixtures shared by unit tests

use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::loader::SampleSheetLoader;
use crate::models::SampleSheet;

/// The six example rows from the sample sheet instructions, header first. The
/// integration tests read the same file.
const DOCUMENTED_SHEET: &str = include_str!("../tests/fixtures/documented_samplesheet.tsv");

/// Header plus the documented rows, ready for [`write_workbook`].
pub fn documented_workbook_rows() -> Vec<Vec<String>> {
    DOCUMENTED_SHEET
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

pub fn header() -> Vec<String> {
    documented_workbook_rows().swap_remove(0)
}

pub fn documented_rows() -> Vec<Vec<String>> {
    documented_workbook_rows().split_off(1)
}

/// The documented sheet parsed from in-memory rows, after `edit` has adjusted the rows.
pub fn documented_sheet_with<F>(edit: F) -> SampleSheet
where
    F: FnOnce(&mut Vec<Vec<String>>),
{
    let mut rows = documented_rows();
    edit(&mut rows);
    let numbered = std::iter::once(header())
        .chain(rows)
        .enumerate()
        .map(|(i, r)| (i + 1, r));
    SampleSheetLoader::from_rows(Path::new("SampleSheet.xlsx"), numbered)
        .expect("documented rows carry every column")
}

pub fn documented_sheet() -> SampleSheet {
    documented_sheet_with(|_| {})
}

/// Write `rows` as the first worksheet of a new workbook at `path`.
pub fn write_workbook(path: &Path, rows: &[Vec<String>]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            worksheet
                .write_string(r as u32, c as u16, value)
                .expect("cell write");
        }
    }
    workbook.save(path).expect("workbook save");
}

mod tests {
    use super::*;
    use crate::models::Column;

    #[test]
    fn test_documented_header_names_every_column() {
        let expected: Vec<&str> = Column::ALL.into_iter().map(Column::header).collect();
        assert_eq!(header(), expected);
        assert!(documented_rows().iter().all(|row| row.len() == expected.len()));
    }
}
