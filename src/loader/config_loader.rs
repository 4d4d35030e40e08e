//! Pipeline config loading

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::models::PipelineConfig;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the pipeline config from `path`, or the built-in defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
        let Some(path) = path else {
            debug!("No pipeline config given, using built-in defaults");
            return Ok(PipelineConfig::default());
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse pipeline config {}", path.display()))?;
        info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<PipelineConfig> {
        // An empty file means "all defaults", serde_yaml reads it as null
        if content.trim().is_empty() {
            return Ok(PipelineConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
