//! Syntax highlighting for message bodies.
//!
//! The highlighter splits a body into contiguous [`Segment`]s, each tagged
//! with an optional [`TokenKind`]. Segments always cover the whole input in
//! order, so joining their text gives back the original body. That property
//! is what lets the error marker work on segments instead of on markup.
//!
//! Markup uses highlight.js class names (`<span class="hljs-string">`), so
//! any highlight.js theme styles the output.

use crate::formatter::content_type::SyntaxClass;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// Kind of a highlighted token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    String,
    Number,
    Literal,
    Comment,
    /// JSON object keys and XML attribute names.
    Attr,
    /// XML tag punctuation.
    Tag,
    /// XML element names.
    Name,
    /// XML declarations and processing instructions.
    Meta,
    SelectorTag,
    SelectorClass,
    SelectorId,
    SelectorPseudo,
    /// CSS property names.
    Attribute,
}

impl TokenKind {
    /// Returns the highlight.js class suffix for this kind.
    pub fn css_class(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Literal => "literal",
            TokenKind::Comment => "comment",
            TokenKind::Attr => "attr",
            TokenKind::Tag => "tag",
            TokenKind::Name => "name",
            TokenKind::Meta => "meta",
            TokenKind::SelectorTag => "selector-tag",
            TokenKind::SelectorClass => "selector-class",
            TokenKind::SelectorId => "selector-id",
            TokenKind::SelectorPseudo => "selector-pseudo",
            TokenKind::Attribute => "attribute",
        }
    }
}

/// A contiguous slice of the highlighted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Byte range into the highlighted text.
    pub range: Range<usize>,
    /// Token kind, `None` for unclassified text.
    pub kind: Option<TokenKind>,
}

impl Segment {
    /// Returns this segment's slice of `source`.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

static JSON_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<string>"(?:[^"\\\n]|\\.)*")|(?P<literal>\b(?:true|false|null)\b)|(?P<number>-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)"#,
    )
    .expect("Failed to compile JSON token regex")
});

static XML_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<comment><!--[\s\S]*?-->)|(?P<cdata><!\[CDATA\[[\s\S]*?\]\]>)|(?P<meta><\?[\s\S]*?\?>|<![A-Za-z][^>]*>)|(?P<tag></?[A-Za-z_:][\w:.-]*(?:[^<>"']|"[^"]*"|'[^']*')*>)"#,
    )
    .expect("Failed to compile XML token regex")
});

static XML_TAG_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?P<value>"[^"]*"|'[^']*')|(?P<close>/?>)|(?P<attr>[^\s=/>"']+)"#)
        .expect("Failed to compile XML tag regex")
});

static CSS_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?P<comment>/\*[\s\S]*?\*/)|(?P<string>"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')|(?P<at>@[\w-]+)|(?P<open>\{)|(?P<close>\})|(?P<hash>#[\w-]+)|(?P<class>\.[A-Za-z_-][\w-]*)|(?P<pseudo>::?[A-Za-z-][\w-]*)|(?P<number>-?(?:\d+\.?\d*|\.\d+)(?:%|[A-Za-z]+)?)|(?P<word>[A-Za-z_-][\w-]*)"#,
    )
    .expect("Failed to compile CSS token regex")
});

static JS_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"(?P<comment>//[^\n]*|/\*[\s\S]*?\*/)"#,
        r#"|(?P<string>"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*'|`(?:[^`\\]|\\[\s\S])*`)"#,
        r#"|(?P<keyword>\b(?:var|let|const|function|return|if|else|for|while|do|switch|case|break|continue|new|delete|typeof|instanceof|in|of|this|class|extends|super|import|export|default|try|catch|finally|throw|async|await|yield)\b)"#,
        r#"|(?P<literal>\b(?:true|false|null|undefined|NaN|Infinity)\b)"#,
        r#"|(?P<number>\b(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?(?:[eE][+-]?\d+)?)\b)"#,
        r#"|(?P<ident>[A-Za-z_$][\w$]*)"#,
    ))
    .expect("Failed to compile JavaScript token regex")
});

/// Accumulates segments, filling gaps and merging unclassified runs.
struct Segments {
    segments: Vec<Segment>,
    pos: usize,
}

impl Segments {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            pos: 0,
        }
    }

    /// Extends the output up to `end` with a segment of the given kind.
    fn push(&mut self, end: usize, kind: Option<TokenKind>) {
        if end <= self.pos {
            return;
        }
        match (self.segments.last_mut(), kind) {
            (Some(last), None) if last.kind.is_none() => last.range.end = end,
            _ => self.segments.push(Segment {
                range: self.pos..end,
                kind,
            }),
        }
        self.pos = end;
    }

    fn token(&mut self, range: Range<usize>, kind: Option<TokenKind>) {
        self.push(range.start, None);
        self.push(range.end, kind);
    }

    fn finish(mut self, len: usize) -> Vec<Segment> {
        self.push(len, None);
        self.segments
    }
}

/// Returns the name of the group that matched.
fn matched_group<'r>(re: &'r Regex, caps: &Captures) -> Option<&'r str> {
    re.capture_names()
        .flatten()
        .find(|name| caps.name(name).is_some())
}

/// Splits `text` into segments using a token regex and a classifier that
/// maps each matched group to a kind.
fn tokenize<F>(text: &str, re: &Regex, mut classify: F) -> Vec<Segment>
where
    F: FnMut(&str, Range<usize>) -> Option<TokenKind>,
{
    let mut out = Segments::new();
    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(group) = matched_group(re, &caps) else {
            continue;
        };
        let kind = classify(group, whole.range());
        out.token(whole.range(), kind);
    }
    out.finish(text.len())
}

fn highlight_json(text: &str) -> Vec<Segment> {
    tokenize(text, &JSON_TOKENS, |group, range| match group {
        "string" if text[range.end..].trim_start().starts_with(':') => Some(TokenKind::Attr),
        "string" => Some(TokenKind::String),
        "literal" => Some(TokenKind::Literal),
        "number" => Some(TokenKind::Number),
        _ => None,
    })
}

fn highlight_xml(text: &str) -> Vec<Segment> {
    let mut out = Segments::new();
    for caps in XML_TOKENS.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        match matched_group(&XML_TOKENS, &caps) {
            Some("comment") => out.token(whole.range(), Some(TokenKind::Comment)),
            Some("cdata") => out.token(whole.range(), Some(TokenKind::String)),
            Some("meta") => out.token(whole.range(), Some(TokenKind::Meta)),
            Some("tag") => {
                out.push(whole.start(), None);
                tag_segments(&mut out, text, whole.range());
            }
            _ => {}
        }
    }
    out.finish(text.len())
}

/// Splits one tag into punctuation, element name, attribute names and
/// attribute values.
fn tag_segments(out: &mut Segments, text: &str, tag: Range<usize>) {
    let source = &text[tag.clone()];
    let open_len = if source.starts_with("</") { 2 } else { 1 };
    let name_len = source[open_len..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(source.len() - open_len);

    out.push(tag.start + open_len, Some(TokenKind::Tag));
    out.push(tag.start + open_len + name_len, Some(TokenKind::Name));

    let rest_start = tag.start + open_len + name_len;
    for caps in XML_TAG_PARTS.captures_iter(&text[rest_start..tag.end]) {
        let Some(part) = caps.get(0) else { continue };
        let range = rest_start + part.start()..rest_start + part.end();
        let kind = match matched_group(&XML_TAG_PARTS, &caps) {
            Some("value") => Some(TokenKind::String),
            Some("close") => Some(TokenKind::Tag),
            Some("attr") => Some(TokenKind::Attr),
            _ => None,
        };
        out.token(range, kind);
    }
    out.push(tag.end, None);
}

fn highlight_css(text: &str) -> Vec<Segment> {
    let mut depth: usize = 0;
    tokenize(text, &CSS_TOKENS, |group, range| {
        let in_block = depth > 0;
        match group {
            "comment" => Some(TokenKind::Comment),
            "string" => Some(TokenKind::String),
            "at" => Some(TokenKind::Keyword),
            "open" => {
                depth += 1;
                None
            }
            "close" => {
                depth = depth.saturating_sub(1);
                None
            }
            "hash" if in_block => Some(TokenKind::Number),
            "hash" => Some(TokenKind::SelectorId),
            "class" if !in_block => Some(TokenKind::SelectorClass),
            "pseudo" if !in_block => Some(TokenKind::SelectorPseudo),
            "number" if in_block => Some(TokenKind::Number),
            "word" if !in_block => Some(TokenKind::SelectorTag),
            "word" if text[range.end..].trim_start().starts_with(':') => {
                Some(TokenKind::Attribute)
            }
            _ => None,
        }
    })
}

fn highlight_javascript(text: &str) -> Vec<Segment> {
    tokenize(text, &JS_TOKENS, |group, _| match group {
        "comment" => Some(TokenKind::Comment),
        "string" => Some(TokenKind::String),
        "keyword" => Some(TokenKind::Keyword),
        "literal" => Some(TokenKind::Literal),
        "number" => Some(TokenKind::Number),
        _ => None,
    })
}

/// Splits text into highlighted segments for a syntax class.
///
/// [`SyntaxClass::None`] yields a single unclassified segment. Empty text
/// yields no segments.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::content_type::SyntaxClass;
/// use txn_inspector::formatter::syntax::{highlight, TokenKind};
///
/// let text = r#"{"ok": true}"#;
/// let segments = highlight(SyntaxClass::Json, text);
/// let joined: String = segments.iter().map(|s| s.text(text)).collect();
/// assert_eq!(joined, text);
/// assert_eq!(segments[1].kind, Some(TokenKind::Attr));
/// ```
pub fn highlight(class: SyntaxClass, text: &str) -> Vec<Segment> {
    match class {
        SyntaxClass::Json => highlight_json(text),
        SyntaxClass::Xml => highlight_xml(text),
        SyntaxClass::Css => highlight_css(text),
        SyntaxClass::Javascript => highlight_javascript(text),
        SyntaxClass::None => Segments::new().finish(text.len()),
    }
}

/// Escapes `&`, `<` and `>` for display as markup.
///
/// The ampersand is replaced first so existing entities are escaped too.
///
/// # Examples
///
/// ```
/// use txn_inspector::formatter::syntax::escape_html;
///
/// assert_eq!(escape_html("a<b>&c"), "a&lt;b&gt;&amp;c");
/// assert_eq!(escape_html("&lt;"), "&amp;lt;");
/// ```
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Renders segments of `text` as markup.
pub fn render_markup(text: &str, segments: &[Segment]) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for segment in segments {
        let escaped = escape_html(segment.text(text));
        match segment.kind {
            Some(kind) => {
                out.push_str("<span class=\"hljs-");
                out.push_str(kind.css_class());
                out.push_str("\">");
                out.push_str(&escaped);
                out.push_str("</span>");
            }
            None => out.push_str(&escaped),
        }
    }
    out
}

/// Highlights `text` and renders it as markup in one step.
pub fn highlight_markup(class: SyntaxClass, text: &str) -> String {
    render_markup(text, &highlight(class, text))
}
