use serde::{Deserialize, Serialize};

use crate::defaults;

/// Settings for the external tools the pipeline drives.
///
/// Every key is optional in the YAML file; anything left out falls back to the
/// values a stock MinION workstation uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub basecaller: BasecallerConfig,
    pub demultiplexer: DemultiplexerConfig,
    pub compressor: CompressorConfig,
    pub archiver: ArchiverConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BasecallerConfig {
    pub program: String,
    pub device: String,
    pub chunk_size: u32,
    pub gpu_runners_per_device: u32,
    pub trim_barcodes: bool,
    pub recursive: bool,
    pub extra_args: Vec<String>,
}

impl Default for BasecallerConfig {
    fn default() -> Self {
        Self {
            program: defaults::BASECALLER_PROGRAM.to_string(),
            device: defaults::BASECALLER_DEVICE.to_string(),
            chunk_size: defaults::BASECALLER_CHUNK_SIZE,
            gpu_runners_per_device: defaults::BASECALLER_GPU_RUNNERS,
            trim_barcodes: true,
            recursive: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemultiplexerConfig {
    pub program: String,
    pub kit: String,
    pub trim: bool,
    pub tsv: bool,
    pub extra_args: Vec<String>,
}

impl Default for DemultiplexerConfig {
    fn default() -> Self {
        Self {
            program: defaults::DEMULTIPLEXER_PROGRAM.to_string(),
            kit: defaults::DEMULTIPLEXER_KIT.to_string(),
            trim: true,
            tsv: true,
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressorConfig {
    pub program: String,
    pub extra_args: Vec<String>,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            program: defaults::COMPRESSOR_PROGRAM.to_string(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiverConfig {
    pub program: String,
    pub extra_args: Vec<String>,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            program: defaults::ARCHIVER_PROGRAM.to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Program names in the order the pipeline invokes them.
    pub fn programs(&self) -> [(&'static str, &str); 4] {
        [
            ("basecaller", self.basecaller.program.as_str()),
            ("demultiplexer", self.demultiplexer.program.as_str()),
            ("compressor", self.compressor.program.as_str()),
            ("archiver", self.archiver.program.as_str()),
        ]
    }
}
