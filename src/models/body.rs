//! Message body data model.

use crate::formatter::content_type::SyntaxClass;
use crate::formatter::marker::ErrorMarker;
use crate::models::serde_helpers::{form_fields, nullable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offset value meaning "no error location".
pub const NO_ERROR_OFFSET: i64 = -1;

/// The body text in one of its three pipeline states.
///
/// On the wire the text is always base64 ([`BodyText::Encoded`]). The decoder
/// turns it into plain text ([`BodyText::Decoded`]) and the formatter turns
/// that into display markup ([`BodyText::Rendered`]). Each transition happens
/// at most once, and the variant says which one the caller is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BodyText {
    /// Base64-encoded raw bytes, as received.
    Encoded(String),
    /// Decoded plain text, before classification and highlighting.
    Decoded(String),
    /// Highlighted or escaped markup, ready for display.
    Rendered(String),
}

impl BodyText {
    /// Returns the underlying string regardless of state.
    pub fn as_str(&self) -> &str {
        match self {
            BodyText::Encoded(s) | BodyText::Decoded(s) | BodyText::Rendered(s) => s,
        }
    }

    pub fn is_encoded(&self) -> bool {
        matches!(self, BodyText::Encoded(_))
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, BodyText::Rendered(_))
    }
}

impl Default for BodyText {
    fn default() -> Self {
        BodyText::Encoded(String::new())
    }
}

impl From<String> for BodyText {
    fn from(s: String) -> Self {
        BodyText::Encoded(s)
    }
}

impl From<BodyText> for String {
    fn from(text: BodyText) -> Self {
        match text {
            BodyText::Encoded(s) | BodyText::Decoded(s) | BodyText::Rendered(s) => s,
        }
    }
}

fn no_error_offset() -> i64 {
    NO_ERROR_OFFSET
}

/// The payload of one side of a transaction.
///
/// The first block of fields comes from the wire; the second block is filled
/// in by [`crate::formatter::classify_and_format`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BodyRecord {
    /// The unparsed `Content-Type` header value.
    #[serde(default)]
    pub raw_content_type: String,

    /// The content type essence (`application/json`), may be empty.
    #[serde(default)]
    pub content_type: String,

    /// Body text; see [`BodyText`] for its states.
    #[serde(default)]
    pub text: BodyText,

    /// Body length in bytes.
    #[serde(default)]
    pub length: usize,

    /// Parse error reported by the capturer for a malformed body.
    #[serde(default, deserialize_with = "nullable")]
    pub error: Option<String>,

    /// Byte offset of the parse error in the body text, or `-1`.
    #[serde(default = "no_error_offset")]
    pub error_offset: i64,

    /// Decoded form parameters for urlencoded bodies.
    #[serde(rename = "Form", default, deserialize_with = "form_fields")]
    pub form_fields: BTreeMap<String, String>,

    #[serde(rename = "isForm", default, skip_deserializing)]
    pub is_form: bool,

    #[serde(rename = "hasContent", default, skip_deserializing)]
    pub has_content: bool,

    #[serde(rename = "hasError", default, skip_deserializing)]
    pub has_error: bool,

    #[serde(rename = "syntaxClass", default, skip_deserializing)]
    pub syntax_class: SyntaxClass,

    /// Location of `error_offset` within the rendered segments.
    #[serde(
        rename = "errorMarker",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_marker: Option<ErrorMarker>,
}

impl Default for BodyRecord {
    fn default() -> Self {
        Self {
            raw_content_type: String::new(),
            content_type: String::new(),
            text: BodyText::default(),
            length: 0,
            error: None,
            error_offset: NO_ERROR_OFFSET,
            form_fields: BTreeMap::new(),
            is_form: false,
            has_content: false,
            has_error: false,
            syntax_class: SyntaxClass::None,
            error_marker: None,
        }
    }
}

impl BodyRecord {
    /// Returns the error offset when one is set.
    pub fn error_offset(&self) -> Option<usize> {
        usize::try_from(self.error_offset).ok()
    }
}
