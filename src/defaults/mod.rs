//! Built-in names and tool settings

/// Name the sample sheet is given once a run completes, both in the output directory
/// and next to the original input.
pub const CANONICAL_SAMPLESHEET_NAME: &str = "SampleSheet.xlsx";

/// Subdirectory of the output directory that receives basecalled reads.
pub const BASECALLING_DIR: &str = "guppy_basecalling";

/// Subdirectory of the output directory that receives per-barcode reads.
pub const DEMULTIPLEXING_DIR: &str = "qcat_demultiplexing";

pub const DEMULTIPLEXER_LOG: &str = "qcat_log.txt";
pub const BARCODE_MAPPING_FILE: &str = "barcode_mapping.tsv";
pub const COMBINED_FASTQ_SUFFIX: &str = "_combined.fastq";
pub const ARCHIVE_EXTENSION: &str = "7z";

pub const BASECALLER_PROGRAM: &str = "guppy_basecaller";
pub const BASECALLER_DEVICE: &str = "cuda:0";
pub const BASECALLER_CHUNK_SIZE: u32 = 1700;
pub const BASECALLER_GPU_RUNNERS: u32 = 4;

pub const DEMULTIPLEXER_PROGRAM: &str = "qcat";
pub const DEMULTIPLEXER_KIT: &str = "Auto";

pub const COMPRESSOR_PROGRAM: &str = "gzip";
pub const ARCHIVER_PROGRAM: &str = "7z";

/// Environment variable that points at a pipeline config file.
pub const CONFIG_ENV_VAR: &str = "MINION_PIPELINE_CONFIG";
