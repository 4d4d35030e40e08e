mod config_loader;
mod samplesheet;

pub use config_loader::ConfigLoader;
pub use samplesheet::{ParseError, SampleSheetLoader};
