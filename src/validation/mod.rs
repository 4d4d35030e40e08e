mod error;
mod error_reporter;
mod rules;
mod validator;

#[cfg(test)]
mod tests;

pub use error::{InvalidSampleSheet, Rule, Scope, ValidationError, ValidationResult};
pub use error_reporter::{ReportFormat, render_json, render_plain, summary_line};
pub use rules::{check_project_id, check_sample_id};
pub use validator::SampleSheetValidator;
