#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Same fixture the unit tests parse.
const DOCUMENTED_SHEET: &str = include_str!("../fixtures/documented_samplesheet.tsv");

/// Header plus the six documented samples of one run.
pub fn sheet_rows() -> Vec<Vec<String>> {
    DOCUMENTED_SHEET
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

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
