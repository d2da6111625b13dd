//! Content type classification.
//!
//! Maps a body's declared content type onto the syntax class used to pick a
//! pretty-printer and a highlighter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type of urlencoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTML is highlighted as XML but never re-indented.
pub const TEXT_HTML: &str = "text/html";

/// Syntax class of a body, which decides how it is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxClass {
    /// XML and HTML markup.
    Xml,
    /// CSS stylesheets.
    Css,
    /// JSON documents.
    Json,
    /// JavaScript sources.
    Javascript,
    /// Anything else; rendered as escaped plain text.
    #[default]
    None,
}

/// Content type to syntax class table. Unlisted types map to
/// [`SyntaxClass::None`].
const SYNTAX_TABLE: &[(&str, SyntaxClass)] = &[
    ("text/xml", SyntaxClass::Xml),
    ("application/xml", SyntaxClass::Xml),
    (TEXT_HTML, SyntaxClass::Xml),
    ("text/css", SyntaxClass::Css),
    ("application/json", SyntaxClass::Json),
    ("text/javascript", SyntaxClass::Javascript),
    ("application/javascript", SyntaxClass::Javascript),
];

impl SyntaxClass {
    /// Looks up the syntax class for a content type.
    ///
    /// Parameters such as `charset` are ignored and the match is
    /// case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use txn_inspector::formatter::content_type::SyntaxClass;
    ///
    /// assert_eq!(SyntaxClass::for_content_type("application/json"), SyntaxClass::Json);
    /// assert_eq!(SyntaxClass::for_content_type("text/html; charset=utf-8"), SyntaxClass::Xml);
    /// assert_eq!(SyntaxClass::for_content_type("image/png"), SyntaxClass::None);
    /// ```
    pub fn for_content_type(content_type: &str) -> Self {
        let essence = essence(content_type);
        SYNTAX_TABLE
            .iter()
            .find(|(ct, _)| *ct == essence)
            .map(|(_, class)| *class)
            .unwrap_or(SyntaxClass::None)
    }

    /// Returns the language tag for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxClass::Xml => "xml",
            SyntaxClass::Css => "css",
            SyntaxClass::Json => "json",
            SyntaxClass::Javascript => "javascript",
            SyntaxClass::None => "none",
        }
    }

    /// Whether bodies of this class can be re-indented.
    pub fn is_pretty_printable(&self) -> bool {
        matches!(self, SyntaxClass::Xml | SyntaxClass::Json)
    }
}

impl fmt::Display for SyntaxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the media type of a content type header value, lowercased and
/// without parameters.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::content_type::essence;
///
/// assert_eq!(essence(" Application/JSON ; charset=utf-8"), "application/json");
/// ```
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Checks whether a content type denotes a urlencoded form.
pub fn is_form(content_type: &str) -> bool {
    essence(content_type) == FORM_URLENCODED
}

/// Checks whether a content type denotes HTML.
pub fn is_html(content_type: &str) -> bool {
    essence(content_type) == TEXT_HTML
}
