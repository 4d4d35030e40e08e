//! Rendering of validation results for people and machines

use colored::Colorize;
use std::path::Path;

use super::error::ValidationResult;

/// Output format for a validation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// One line per problem, no colour. Used for logs and plain terminals.
pub fn render_plain(result: &ValidationResult) -> String {
    if result.success {
        return "sample sheet is valid".to_string();
    }
    result
        .errors
        .iter()
        .map(|e| format!("[{}] {}: {}", e.rule, e.scope, e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(result: &ValidationResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Short coloured summary line for the terminal.
pub fn summary_line(path: &Path, result: &ValidationResult) -> String {
    if result.success {
        format!("✅ {} passed validation", path.display())
            .green()
            .to_string()
    } else {
        format!(
            "❌ {} failed validation with {} problem(s)",
            path.display(),
            result.errors.len()
        )
        .red()
        .bold()
        .to_string()
    }
}
