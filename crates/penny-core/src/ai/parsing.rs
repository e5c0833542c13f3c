//! Lenient JSON extraction for model output
//!
//! The beautifier is asked for a JSON array, but models wrap it in prose,
//! markdown fences and typographic quotes. Extraction runs as a fixed pipeline:
//!
//! 1. [`normalize_quotes`]
//! 2. [`locate_array_start`]
//! 3. [`locate_array_end`]
//! 4. trim surrounding whitespace
//! 5. [`strip_control_chars`]
//! 6. strict JSON parse
//!
//! The parsed value is not checked against any schema.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Why extraction failed
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No JSON array start found")]
    NoArrayStart,

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

const FENCE: &str = "```";

/// Replace typographic quotes with their ASCII equivalents
pub fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
}

/// Byte index of the first `[`
pub fn locate_array_start(text: &str) -> Option<usize> {
    text.find('[')
}

/// Byte index of the first fence at or after `start`, or the end of the text
pub fn locate_array_end(text: &str, start: usize) -> usize {
    text[start..]
        .find(FENCE)
        .map(|offset| start + offset)
        .unwrap_or(text.len())
}

/// Remove NUL and carriage-return characters
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\0' | '\r')).collect()
}

/// Extract the first JSON array-like value from model output
pub fn extract_json_array(text: &str) -> Result<Value, ExtractError> {
    let text = normalize_quotes(text);
    let start = locate_array_start(&text).ok_or(ExtractError::NoArrayStart)?;
    let end = locate_array_end(&text, start);
    let candidate = strip_control_chars(text[start..end].trim());
    Ok(serde_json::from_str(&candidate)?)
}

/// Extract JSON from model output, returning `None` on any failure
///
/// Failures are logged with the reason and the full raw text.
pub fn safe_parse_json(text: &str) -> Option<Value> {
    match extract_json_array(text) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, raw = %text, "JSON parsing failed");
            None
        }
    }
}
