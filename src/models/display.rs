//! Display implementations for models

use super::sample_sheet::{Column, SampleSheet};

const TABLE_COLUMNS: [Column; 5] = [
    Column::SampleId,
    Column::SampleName,
    Column::Barcode,
    Column::ProjectId,
    Column::User,
];

impl SampleSheet {
    /// Render the run metadata and a per-sample table.
    pub fn to_table(&self) -> String {
        let mut out = String::new();

        if let Some(first) = self.records().first() {
            out.push_str(&format!("Run:        {}\n", first.run_id));
            out.push_str(&format!("Instrument: {}\n", first.instrument_id));
            out.push_str(&format!("Protocol:   {}\n", first.run_protocol));
            out.push_str(&format!(
                "Flowcell:   {}  Kit: {}  Reads: {}\n",
                first.flowcell_type, first.sequencing_kit, first.read_type
            ));
            out.push('\n');
        }

        let mut widths: Vec<usize> = TABLE_COLUMNS.iter().map(|c| c.header().len()).collect();
        for record in self.records() {
            for (width, column) in widths.iter_mut().zip(TABLE_COLUMNS) {
                *width = (*width).max(record.get(column).chars().count());
            }
        }

        let header: Vec<String> = TABLE_COLUMNS
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c.header()))
            .collect();
        out.push_str(&format!("Row  {}\n", header.join("  ").trim_end()));

        for record in self.records() {
            let cells: Vec<String> = TABLE_COLUMNS
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<w$}", record.get(*c)))
                .collect();
            out.push_str(&format!("{:<4} {}\n", record.row, cells.join("  ").trim_end()));
        }

        out
    }

    pub fn pretty_print(&self) {
        print!("{}", self.to_table());
    }
}
