pub mod config;
pub mod display;
pub mod sample_sheet;

// Re-export commonly used types
pub use config::{
    ArchiverConfig, BasecallerConfig, CompressorConfig, DemultiplexerConfig, PipelineConfig,
};
pub use sample_sheet::{BarcodeAssignment, Column, SampleRecord, SampleSheet};
