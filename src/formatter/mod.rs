//! Body classification and formatting.
//!
//! Takes a decoded [`BodyRecord`] and fills in everything the presentation
//! layer needs: form/content/error flags, the syntax class, an optional
//! pretty-print pass, the highlighted markup and the error marker.

pub mod content_type;
pub mod json;
pub mod marker;
pub mod metadata;
pub mod syntax;
pub mod xml;

pub use content_type::SyntaxClass;
pub use marker::{locate_error, ErrorMarker};
pub use metadata::{format_duration, StatusClass};
pub use syntax::{escape_html, highlight, render_markup, Segment, TokenKind};

use crate::config::InspectorConfig;
use crate::models::{BodyRecord, BodyText};
use log::debug;
use std::fmt;

/// Default indentation width for pretty-printed bodies.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Bodies larger than this are never pretty-printed (10MB).
pub const DEFAULT_MAX_FORMAT_SIZE: usize = 10 * 1024 * 1024;

/// Errors that can occur while formatting a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// JSON parsing or formatting error.
    JsonError(String),

    /// XML parsing or formatting error.
    XmlError(String),

    /// UTF-8 encoding error.
    EncodingError(String),

    /// Body too large to pretty-print.
    BodyTooLarge(usize),

    /// The body text is still base64 and must be decoded first.
    NotDecoded,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::JsonError(msg) => write!(f, "JSON formatting error: {}", msg),
            FormatError::XmlError(msg) => write!(f, "XML formatting error: {}", msg),
            FormatError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            FormatError::BodyTooLarge(size) => {
                write!(f, "Body too large to format: {} bytes", size)
            }
            FormatError::NotDecoded => write!(f, "Body text has not been decoded"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Knobs for the formatting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nesting level when pretty-printing.
    pub indent_width: usize,
    /// Bodies above this size are left as-is.
    pub max_format_size: usize,
    /// Whether XML and JSON bodies are re-indented at all.
    pub pretty_print: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent_width: DEFAULT_INDENT_WIDTH,
            max_format_size: DEFAULT_MAX_FORMAT_SIZE,
            pretty_print: true,
        }
    }
}

impl From<&InspectorConfig> for FormatOptions {
    fn from(config: &InspectorConfig) -> Self {
        Self {
            indent_width: config.indent_width,
            max_format_size: config.max_format_size,
            pretty_print: config.pretty_print,
        }
    }
}

/// Pretty-prints a body of a pretty-printable syntax class.
///
/// # Returns
///
/// The re-indented text, or an error for malformed or oversized bodies and
/// for classes that have no pretty-printer.
pub fn pretty_print(
    class: SyntaxClass,
    text: &str,
    options: &FormatOptions,
) -> Result<String, FormatError> {
    match class {
        SyntaxClass::Json => {
            json::format_json_pretty(text, options.indent_width, options.max_format_size)
        }
        SyntaxClass::Xml => {
            xml::format_xml_pretty(text, options.indent_width, options.max_format_size)
        }
        other => Err(FormatError::EncodingError(format!(
            "no pretty-printer for {}",
            other
        ))),
    }
}

/// Classifies a decoded body and renders it for display.
///
/// Sets `is_form`, `has_content`, `has_error` and `syntax_class`, then
/// replaces the decoded text with rendered markup:
///
/// - XML and JSON bodies without a reported error are pretty-printed first
///   (HTML never is). A failed pretty-print keeps the text as it was.
/// - Bodies with a syntax class are highlighted; everything else, and every
///   form body, is only escaped.
/// - When the body carries an error offset, `error_marker` points at the
///   segment of the plain text that contains it.
///
/// An already rendered body is left alone.
///
/// # Arguments
///
/// * `body` - The body to format, with decoded text
/// * `options` - Pretty-printing settings
///
/// # Returns
///
/// `Ok(())` on success, or `Err(FormatError::NotDecoded)` if the body text
/// is still base64. Pretty-print failures are never returned.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::{classify_and_format, FormatOptions, SyntaxClass};
/// use txn_inspector::models::{BodyRecord, BodyText};
///
/// let mut body = BodyRecord {
///     content_type: "application/json".to_string(),
///     text: BodyText::Decoded(r#"{"a":1}"#.to_string()),
///     length: 7,
///     ..Default::default()
/// };
/// classify_and_format(&mut body, &FormatOptions::default()).unwrap();
///
/// assert_eq!(body.syntax_class, SyntaxClass::Json);
/// assert!(body.text.is_rendered());
/// assert!(body.text.as_str().contains("<span class=\"hljs-attr\">\"a\"</span>"));
/// ```
pub fn classify_and_format(
    body: &mut BodyRecord,
    options: &FormatOptions,
) -> Result<(), FormatError> {
    let text = match &body.text {
        BodyText::Rendered(_) => return Ok(()),
        BodyText::Encoded(_) => return Err(FormatError::NotDecoded),
        BodyText::Decoded(text) => text.as_str(),
    };

    let is_form = content_type::is_form(&body.content_type);
    let has_content = body.length > 0;
    let has_error = body.error.as_deref().is_some_and(|e| !e.is_empty());
    let syntax_class = SyntaxClass::for_content_type(&body.content_type);

    let render_class = if is_form {
        SyntaxClass::None
    } else {
        syntax_class
    };

    let pretty = if options.pretty_print
        && !has_error
        && render_class.is_pretty_printable()
        && !content_type::is_html(&body.content_type)
    {
        match pretty_print(render_class, text, options) {
            Ok(formatted) => Some(formatted),
            Err(e) => {
                debug!("Keeping {} body as-is: {}", render_class, e);
                None
            }
        }
    } else {
        None
    };
    let plain = pretty.as_deref().unwrap_or(text);

    let segments = highlight(render_class, plain);
    let error_marker = if has_error {
        body.error_offset()
            .and_then(|offset| locate_error(&segments, offset))
    } else {
        None
    };
    let rendered = render_markup(plain, &segments);

    body.is_form = is_form;
    body.has_content = has_content;
    body.has_error = has_error;
    body.syntax_class = syntax_class;
    body.error_marker = error_marker;
    body.text = BodyText::Rendered(rendered);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoded(content_type: &str, text: &str) -> BodyRecord {
        BodyRecord {
            content_type: content_type.to_string(),
            text: BodyText::Decoded(text.to_string()),
            length: text.len(),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_is_pretty_printed_and_highlighted() {
        let mut body = decoded("application/json", r#"{"a":1}"#);
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert_eq!(
            body.text.as_str(),
            "{\n    <span class=\"hljs-attr\">\"a\"</span>: <span class=\"hljs-number\">1</span>\n}"
        );
        assert_eq!(body.syntax_class, SyntaxClass::Json);
        assert!(body.has_content);
        assert!(!body.has_error);
        assert!(!body.is_form);
    }

    #[test]
    fn test_indent_width_option() {
        let mut body = decoded("application/xml", "<a><b/></a>");
        let options = FormatOptions {
            indent_width: 1,
            ..Default::default()
        };
        classify_and_format(&mut body, &options).unwrap();
        assert!(body.text.as_str().contains("\n <span class=\"hljs-tag\">"));
    }

    #[test]
    fn test_pretty_print_disabled() {
        let mut body = decoded("application/json", r#"{"a":1}"#);
        let options = FormatOptions {
            pretty_print: false,
            ..Default::default()
        };
        classify_and_format(&mut body, &options).unwrap();
        assert!(!body.text.as_str().contains('\n'));
    }

    #[test]
    fn test_malformed_json_kept_as_is() {
        let mut body = decoded("application/json", "{oops");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();
        assert_eq!(body.text.as_str(), "{oops");
        assert!(body.text.is_rendered());
    }

    #[test]
    fn test_html_is_highlighted_but_not_reindented() {
        let mut body = decoded("text/html; charset=utf-8", "<p><b>x</b></p>");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert_eq!(body.syntax_class, SyntaxClass::Xml);
        assert!(!body.text.as_str().contains('\n'));
        assert!(body.text.as_str().contains("hljs-name"));
    }

    #[test]
    fn test_form_body_is_only_escaped() {
        let mut body = decoded("application/x-www-form-urlencoded", "a=1&b=<2>");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert!(body.is_form);
        assert_eq!(body.syntax_class, SyntaxClass::None);
        assert_eq!(body.text.as_str(), "a=1&amp;b=&lt;2&gt;");
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let mut body = decoded("text/plain", "1 < 2 && 3 > 2");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();
        assert_eq!(body.text.as_str(), "1 &lt; 2 &amp;&amp; 3 &gt; 2");
    }

    #[test]
    fn test_unclassified_markup_is_escaped_ampersand_first() {
        let mut body = decoded("application/octet-stream", "<a>&b</a>");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert_eq!(body.syntax_class, SyntaxClass::None);
        assert_eq!(body.text.as_str(), "&lt;a&gt;&amp;b&lt;/a&gt;");
    }

    #[test]
    fn test_error_body_skips_pretty_print_and_gets_marker() {
        let mut body = decoded("application/json", r#"{"a":1x}"#);
        body.error = Some("invalid character 'x' after object key:value pair".to_string());
        body.error_offset = 6;
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert!(body.has_error);
        assert!(!body.text.as_str().contains('\n'));
        let marker = body.error_marker.clone().unwrap();
        assert_eq!(&r#"{"a":1x}"#[marker.start..marker.end], "x}");
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let mut body = decoded("application/json", r#"{"a":1}"#);
        body.error = Some(String::new());
        body.error_offset = 2;
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert!(!body.has_error);
        assert!(body.error_marker.is_none());
        assert!(body.text.as_str().contains('\n'));
    }

    #[test]
    fn test_empty_body() {
        let mut body = decoded("", "");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();

        assert!(!body.has_content);
        assert_eq!(body.text, BodyText::Rendered(String::new()));
    }

    #[test]
    fn test_encoded_body_is_rejected() {
        let mut body = BodyRecord::default();
        let result = classify_and_format(&mut body, &FormatOptions::default());
        assert_eq!(result, Err(FormatError::NotDecoded));
        assert!(body.text.is_encoded());
    }

    #[test]
    fn test_rendered_body_is_left_alone() {
        let mut body = decoded("text/plain", "<");
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();
        classify_and_format(&mut body, &FormatOptions::default()).unwrap();
        assert_eq!(body.text.as_str(), "&lt;");
    }

    #[test]
    fn test_oversized_body_is_not_pretty_printed() {
        let mut body = decoded("application/json", r#"{"a":1}"#);
        let options = FormatOptions {
            max_format_size: 3,
            ..Default::default()
        };
        classify_and_format(&mut body, &options).unwrap();
        assert!(!body.text.as_str().contains('\n'));
    }

    #[test]
    fn test_format_error_display() {
        assert_eq!(
            FormatError::BodyTooLarge(12).to_string(),
            "Body too large to format: 12 bytes"
        );
        assert_eq!(
            FormatError::NotDecoded.to_string(),
            "Body text has not been decoded"
        );
    }
}
