use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the eleven columns every sample sheet must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Sample_ID")]
    SampleId,
    #[serde(rename = "Sample_Name")]
    SampleName,
    #[serde(rename = "Barcode")]
    Barcode,
    #[serde(rename = "Run_ID")]
    RunId,
    #[serde(rename = "Run_Protocol")]
    RunProtocol,
    #[serde(rename = "Instrument_ID")]
    InstrumentId,
    #[serde(rename = "Sequencing_Kit")]
    SequencingKit,
    #[serde(rename = "Flowcell_Type")]
    FlowcellType,
    #[serde(rename = "Project_ID")]
    ProjectId,
    #[serde(rename = "Read_Type")]
    ReadType,
    #[serde(rename = "User")]
    User,
}

impl Column {
    /// Required columns in the order they are documented and checked.
    pub const ALL: [Column; 11] = [
        Column::SampleId,
        Column::SampleName,
        Column::Barcode,
        Column::RunId,
        Column::RunProtocol,
        Column::InstrumentId,
        Column::SequencingKit,
        Column::FlowcellType,
        Column::ProjectId,
        Column::ReadType,
        Column::User,
    ];

    /// Header text as it must appear in the spreadsheet (case-sensitive).
    pub fn header(self) -> &'static str {
        match self {
            Column::SampleId => "Sample_ID",
            Column::SampleName => "Sample_Name",
            Column::Barcode => "Barcode",
            Column::RunId => "Run_ID",
            Column::RunProtocol => "Run_Protocol",
            Column::InstrumentId => "Instrument_ID",
            Column::SequencingKit => "Sequencing_Kit",
            Column::FlowcellType => "Flowcell_Type",
            Column::ProjectId => "Project_ID",
            Column::ReadType => "Read_Type",
            Column::User => "User",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One row of a sample sheet.
///
/// Values are kept exactly as they were read from the spreadsheet; no trimming or case
/// folding happens here so that validation sees what the operator typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// 1-based position among the data rows of the sheet.
    pub row: usize,
    /// 1-based spreadsheet line the record was read from.
    pub line: usize,

    #[serde(rename = "Sample_ID")]
    pub sample_id: String,
    #[serde(rename = "Sample_Name")]
    pub sample_name: String,
    #[serde(rename = "Barcode")]
    pub barcode: String,
    #[serde(rename = "Run_ID")]
    pub run_id: String,
    #[serde(rename = "Run_Protocol")]
    pub run_protocol: String,
    #[serde(rename = "Instrument_ID")]
    pub instrument_id: String,
    #[serde(rename = "Sequencing_Kit")]
    pub sequencing_kit: String,
    #[serde(rename = "Flowcell_Type")]
    pub flowcell_type: String,
    #[serde(rename = "Project_ID")]
    pub project_id: String,
    #[serde(rename = "Read_Type")]
    pub read_type: String,
    #[serde(rename = "User")]
    pub user: String,
}

impl SampleRecord {
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::SampleId => &self.sample_id,
            Column::SampleName => &self.sample_name,
            Column::Barcode => &self.barcode,
            Column::RunId => &self.run_id,
            Column::RunProtocol => &self.run_protocol,
            Column::InstrumentId => &self.instrument_id,
            Column::SequencingKit => &self.sequencing_kit,
            Column::FlowcellType => &self.flowcell_type,
            Column::ProjectId => &self.project_id,
            Column::ReadType => &self.read_type,
            Column::User => &self.user,
        }
    }

    /// Build a record from a column lookup. Columns the lookup cannot answer are left empty.
    pub fn from_lookup<F>(row: usize, line: usize, mut lookup: F) -> Self
    where
        F: FnMut(Column) -> Option<String>,
    {
        let mut value = |c| lookup(c).unwrap_or_default();
        Self {
            row,
            line,
            sample_id: value(Column::SampleId),
            sample_name: value(Column::SampleName),
            barcode: value(Column::Barcode),
            run_id: value(Column::RunId),
            run_protocol: value(Column::RunProtocol),
            instrument_id: value(Column::InstrumentId),
            sequencing_kit: value(Column::SequencingKit),
            flowcell_type: value(Column::FlowcellType),
            project_id: value(Column::ProjectId),
            read_type: value(Column::ReadType),
            user: value(Column::User),
        }
    }
}

/// Barcode to sample assignment handed to the demultiplexing step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeAssignment {
    #[serde(rename = "Barcode")]
    pub barcode: String,
    #[serde(rename = "Sample_ID")]
    pub sample_id: String,
    #[serde(rename = "Sample_Name")]
    pub sample_name: String,
}

/// Parsed sample sheet. Records keep spreadsheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SampleSheet {
    records: Vec<SampleRecord>,
}

impl SampleSheet {
    pub fn new(records: Vec<SampleRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SampleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One assignment per record, in sheet order.
    pub fn barcode_assignments(&self) -> Vec<BarcodeAssignment> {
        self.records
            .iter()
            .map(|r| BarcodeAssignment {
                barcode: r.barcode.clone(),
                sample_id: r.sample_id.clone(),
                sample_name: r.sample_name.clone(),
            })
            .collect()
    }

    /// Flowcell and kit of the first record, as the basecaller expects them.
    pub fn basecalling_profile(&self) -> Option<(&str, &str)> {
        self.records
            .first()
            .map(|r| (r.flowcell_type.as_str(), r.sequencing_kit.as_str()))
    }

    /// Records whose flowcell/kit pair differs from the first record.
    pub fn profile_mismatches(&self) -> Vec<&SampleRecord> {
        let Some((flowcell, kit)) = self.basecalling_profile() else {
            return Vec::new();
        };
        self.records
            .iter()
            .filter(|r| r.flowcell_type != flowcell || r.sequencing_kit != kit)
            .collect()
    }
}
