//! Field-level rules for sample sheet values

use once_cell::sync::Lazy;
use regex::Regex;

static SAMPLE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^MIN-[0-9]{4}-[0-9]{6}$").expect("sample id pattern"));

static PROJECT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("project id pattern"));

const SAMPLE_ID_EXAMPLE: &str = "MIN-2020-000001";

/// Check a Sample_ID against `MIN-YYYY-XXXXXX`. The error names the first part that is wrong.
pub fn check_sample_id(value: &str) -> Result<(), String> {
    if SAMPLE_ID_PATTERN.is_match(value) {
        return Ok(());
    }

    let parts: Vec<&str> = value.split('-').collect();
    let detail = if value.is_empty() {
        "is empty".to_string()
    } else if parts.len() != 3 {
        "does not have three '-'-separated parts".to_string()
    } else if parts[0] != "MIN" {
        format!("starts with '{}' instead of 'MIN'", parts[0])
    } else if !is_digits(parts[1], 4) {
        format!("has year '{}', expected 4 digits (YYYY)", parts[1])
    } else if !is_digits(parts[2], 6) {
        format!("has number '{}', expected 6 digits (XXXXXX)", parts[2])
    } else {
        "is not in the expected format".to_string()
    };

    Err(format!(
        "Sample_ID '{value}' {detail}; expected MIN-YYYY-XXXXXX, e.g. {SAMPLE_ID_EXAMPLE}"
    ))
}

/// Check that a Project_ID only uses letters, digits, `_` and `-`.
pub fn check_project_id(value: &str) -> Result<(), String> {
    if PROJECT_ID_PATTERN.is_match(value) {
        return Ok(());
    }
    if value.is_empty() {
        return Err("Project_ID is empty".to_string());
    }

    let mut offending: Vec<char> = Vec::new();
    for c in value.chars() {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == '-') && !offending.contains(&c) {
            offending.push(c);
        }
    }
    let listed = offending
        .iter()
        .map(|c| describe_char(*c))
        .collect::<Vec<_>>()
        .join(", ");

    Err(format!(
        "Project_ID '{value}' contains characters other than letters, digits, '_' and '-': {listed}"
    ))
}

fn is_digits(part: &str, width: usize) -> bool {
    part.len() == width && part.bytes().all(|b| b.is_ascii_digit())
}

fn describe_char(c: char) -> String {
    match c {
        ' ' => "space".to_string(),
        '\t' => "tab".to_string(),
        '\n' | '\r' => "line break".to_string(),
        c if c.is_whitespace() => format!("whitespace U+{:04X}", c as u32),
        c => format!("'{c}'"),
    }
}
