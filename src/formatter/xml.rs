//! XML re-indentation and well-formedness checking.
//!
//! Neither function builds a DOM; both walk the characters once, which keeps
//! large captured bodies cheap to handle.

use crate::formatter::FormatError;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Formats XML with one tag per line and nested indentation.
///
/// Text content stays inline with its element (`<a>text</a>`). Declarations,
/// comments, CDATA sections and processing instructions are copied as-is on
/// their own lines.
///
/// # Arguments
///
/// * `xml` - XML text to format
/// * `indent_width` - Spaces per nesting level
/// * `max_size` - Bodies larger than this are not formatted
///
/// # Returns
///
/// `Ok(String)` with the formatted XML, or `Err(FormatError)` if the
/// document is empty, malformed or too large.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::xml::format_xml_pretty;
///
/// let formatted = format_xml_pretty("<a><b>hi</b><c/></a>", 2, 1024).unwrap();
/// assert_eq!(formatted, "<a>\n  <b>hi</b>\n  <c/>\n</a>");
/// ```
pub fn format_xml_pretty(
    xml: &str,
    indent_width: usize,
    max_size: usize,
) -> Result<String, FormatError> {
    if xml.len() > max_size {
        return Err(FormatError::BodyTooLarge(xml.len()));
    }

    let xml = xml.trim();
    if xml.is_empty() {
        return Err(FormatError::XmlError("Empty XML content".to_string()));
    }

    check_xml(xml).map_err(|e| FormatError::XmlError(e.to_string()))?;

    let mut printer = Printer::new(indent_width, xml.len());
    printer.run(xml);
    Ok(printer.finish())
}

/// Output state of the indenter.
struct Printer {
    out: String,
    unit: String,
    level: usize,
    /// True while the current output line already holds something.
    line_open: bool,
}

impl Printer {
    fn new(indent_width: usize, capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity * 2),
            unit: " ".repeat(indent_width),
            level: 0,
            line_open: false,
        }
    }

    fn start_line(&mut self) {
        if !self.line_open {
            for _ in 0..self.level {
                self.out.push_str(&self.unit);
            }
            self.line_open = true;
        }
    }

    fn end_line(&mut self) {
        self.out.push('\n');
        self.line_open = false;
    }

    /// Copies characters up to and including `terminator`.
    fn copy_through(&mut self, chars: &mut Peekable<Chars>, terminator: &str) {
        while let Some(c) = chars.next() {
            self.out.push(c);
            if self.out.ends_with(terminator) {
                break;
            }
        }
    }

    fn run(&mut self, xml: &str) {
        let mut chars = xml.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '<' => match chars.peek().copied() {
                    Some('!') => {
                        self.start_line();
                        self.out.push('<');
                        let terminator = if xml_lookahead(&chars, "!--") {
                            "-->"
                        } else if xml_lookahead(&chars, "![CDATA[") {
                            "]]>"
                        } else {
                            ">"
                        };
                        self.copy_through(&mut chars, terminator);
                        self.end_line();
                    }
                    Some('?') => {
                        self.start_line();
                        self.out.push('<');
                        self.copy_through(&mut chars, "?>");
                        self.end_line();
                    }
                    Some('/') => {
                        self.level = self.level.saturating_sub(1);
                        self.start_line();
                        self.out.push('<');
                        self.copy_through(&mut chars, ">");
                        self.end_line();
                    }
                    _ => self.open_tag(&mut chars),
                },
                c if c.is_whitespace() => {}
                _ => self.text(ch, &mut chars),
            }
        }
    }

    fn open_tag(&mut self, chars: &mut Peekable<Chars>) {
        self.start_line();
        self.out.push('<');

        let mut quote: Option<char> = None;
        let mut prev = '<';
        while let Some(c) = chars.next() {
            self.out.push(c);
            match (quote, c) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(c),
                (None, '>') => {
                    if prev == '/' {
                        self.end_line();
                    } else {
                        self.level += 1;
                        // Text content stays on the tag's line.
                        if next_non_whitespace(chars) == Some('<') {
                            self.end_line();
                        }
                    }
                    return;
                }
                (None, _) => {}
            }
            prev = c;
        }
    }

    fn text(&mut self, first: char, chars: &mut Peekable<Chars>) {
        self.start_line();
        self.out.push(first);

        let mut pending_space = false;
        while let Some(&next) = chars.peek() {
            if next == '<' {
                break;
            }
            chars.next();
            if next.is_whitespace() {
                pending_space = true;
            } else {
                if pending_space {
                    self.out.push(' ');
                    pending_space = false;
                }
                self.out.push(next);
            }
        }

        // Mixed content: text followed by a child element gets its own line.
        let mut ahead = chars.clone();
        ahead.next();
        if ahead.peek() != Some(&'/') {
            self.end_line();
        }
    }

    fn finish(mut self) -> String {
        let trimmed = self.out.trim_end().len();
        self.out.truncate(trimmed);
        self.out
    }
}

fn xml_lookahead(chars: &Peekable<Chars>, prefix: &str) -> bool {
    chars.clone().take(prefix.len()).eq(prefix.chars())
}

fn next_non_whitespace(chars: &Peekable<Chars>) -> Option<char> {
    chars.clone().find(|c| !c.is_whitespace())
}

/// An XML well-formedness error and the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for XmlSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XML syntax error on line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for XmlSyntaxError {}

/// Character cursor that counts lines as it goes.
struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        xml_lookahead(&self.chars, prefix)
    }

    fn error(&self, message: impl Into<String>) -> XmlSyntaxError {
        XmlSyntaxError {
            line: self.line,
            message: message.into(),
        }
    }

    /// Skips past `terminator`, failing at end of input.
    fn skip_through(&mut self, terminator: &str) -> Result<(), XmlSyntaxError> {
        let tail: Vec<char> = terminator.chars().collect();
        let mut window: Vec<char> = Vec::with_capacity(tail.len());
        while let Some(c) = self.bump() {
            if window.len() == tail.len() {
                window.remove(0);
            }
            window.push(c);
            if window == tail {
                return Ok(());
            }
        }
        Err(self.error("unexpected EOF"))
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            name.push(c);
            self.bump();
        }
        name
    }
}

/// Checks that a document is well-formed XML.
///
/// Element nesting is verified with a tag stack; comments, CDATA, doctype
/// declarations and processing instructions are skipped. The document must
/// contain at least one element; several top-level elements are tolerated,
/// as capturing backends accept a stream of elements.
///
/// # Returns
///
/// `Ok(())` when the document is well-formed, or the first error found
/// together with its line number.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::xml::check_xml;
///
/// assert!(check_xml("<a><b/></a>").is_ok());
/// let err = check_xml("<a>\n<b>\n</a>").unwrap_err();
/// assert_eq!(err.line, 3);
/// ```
pub fn check_xml(xml: &str) -> Result<(), XmlSyntaxError> {
    let mut cursor = Cursor::new(xml);
    let mut open: Vec<String> = Vec::new();
    let mut seen_element = false;

    while let Some(ch) = cursor.bump() {
        if ch != '<' {
            continue;
        }

        if cursor.starts_with("!--") {
            cursor.skip_through("-->")?;
        } else if cursor.starts_with("![CDATA[") {
            cursor.skip_through("]]>")?;
        } else if cursor.starts_with("!") {
            cursor.skip_through(">")?;
        } else if cursor.starts_with("?") {
            cursor.skip_through("?>")?;
        } else if cursor.starts_with("/") {
            cursor.bump();
            let name = cursor.read_name();
            match open.pop() {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(cursor.error(format!(
                        "element <{}> closed by </{}>",
                        expected, name
                    )))
                }
                None => {
                    return Err(cursor.error(format!("unexpected end element </{}>", name)))
                }
            }
            cursor.skip_through(">")?;
        } else {
            let name = cursor.read_name();
            if name.is_empty() {
                return Err(cursor.error("expected element name after <"));
            }
            seen_element = true;
            if !skip_tag_body(&mut cursor)? {
                open.push(name);
            }
        }
    }

    if !open.is_empty() || !seen_element {
        return Err(cursor.error("unexpected EOF"));
    }
    Ok(())
}

/// Skips attributes up to the closing `>`, honouring quoted values.
///
/// Returns true for a self-closing tag.
fn skip_tag_body(cursor: &mut Cursor) -> Result<bool, XmlSyntaxError> {
    let mut quote: Option<char> = None;
    let mut prev = ' ';
    while let Some(c) = cursor.bump() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '<') => return Err(cursor.error("unexpected < in element")),
            (None, '>') => return Ok(prev == '/'),
            (None, _) => {}
        }
        prev = c;
    }
    Err(cursor.error("unexpected EOF"))
}

/// Validates whether a string is well-formed XML.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::xml::validate_xml;
///
/// assert!(validate_xml("<root><child>text</child></root>"));
/// assert!(!validate_xml("<unclosed>"));
/// ```
pub fn validate_xml(xml: &str) -> bool {
    check_xml(xml).is_ok()
}
