//! JSON pretty-printing and validation.
//!
//! Key order and number spelling are preserved (`preserve_order` and
//! `arbitrary_precision`), so re-indenting never changes what a body says.

use crate::formatter::FormatError;
use serde::Serialize;
use serde_json::Value;

/// Formats JSON with the given indentation width.
///
/// # Arguments
///
/// * `json` - JSON text to format
/// * `indent_width` - Spaces per nesting level
/// * `max_size` - Bodies larger than this are not formatted
///
/// # Returns
///
/// `Ok(String)` with the formatted JSON, or `Err(FormatError)` if the JSON
/// is malformed or too large.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::json::format_json_pretty;
///
/// let formatted = format_json_pretty(r#"{"b":1,"a":[true]}"#, 2, 1024).unwrap();
/// assert_eq!(formatted, "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}");
/// ```
pub fn format_json_pretty(
    json: &str,
    indent_width: usize,
    max_size: usize,
) -> Result<String, FormatError> {
    if json.len() > max_size {
        return Err(FormatError::BodyTooLarge(json.len()));
    }

    let value: Value =
        serde_json::from_str(json).map_err(|e| FormatError::JsonError(e.to_string()))?;

    let indent = " ".repeat(indent_width);
    let mut buf = Vec::with_capacity(json.len() + (json.len() / 2));
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

    value
        .serialize(&mut serializer)
        .map_err(|e| FormatError::JsonError(e.to_string()))?;

    String::from_utf8(buf).map_err(|e| FormatError::EncodingError(e.to_string()))
}

/// A JSON syntax error with its byte offset into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonSyntaxError {
    pub message: String,
    pub offset: usize,
}

/// Validates a JSON document, locating the first syntax error.
///
/// # Returns
///
/// `Ok(())` for valid JSON, or the error message and the byte offset of the
/// error (clamped to the document length).
pub fn check_json(body: &[u8]) -> Result<(), JsonSyntaxError> {
    match serde_json::from_slice::<serde::de::IgnoredAny>(body) {
        Ok(_) => Ok(()),
        Err(e) => Err(JsonSyntaxError {
            message: e.to_string(),
            offset: offset_of(body, e.line(), e.column()),
        }),
    }
}

/// Converts a 1-based line and column into a byte offset.
fn offset_of(body: &[u8], line: usize, column: usize) -> usize {
    let line_start: usize = body
        .split_inclusive(|&b| b == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(body.len())
}

/// Validates whether a string is valid JSON.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::json::validate_json;
///
/// assert!(validate_json(r#"{"valid": true}"#));
/// assert!(!validate_json("{invalid json}"));
/// ```
pub fn validate_json(json: &str) -> bool {
    check_json(json.as_bytes()).is_ok()
}
