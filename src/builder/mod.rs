//! Serialization of captured exchanges into transaction records.
//!
//! Produces records in exactly the shape the capturing backend sends them:
//! base64 wire bytes, content type essence, body validation with error
//! offsets, parsed form fields and binary detection. Embedding backends,
//! tests and benchmarks use it to feed the store.

use crate::decoder::encode_base64;
use crate::formatter::content_type::{essence, FORM_URLENCODED};
use crate::formatter::json::check_json;
use crate::formatter::xml::check_xml;
use crate::models::message::ValueMap;
use crate::models::serde_helpers::FORM_VALUE_SEPARATOR;
use crate::models::{BodyRecord, BodyText, MessageRecord, TransactionRecord};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use url::form_urlencoded;
use uuid::Uuid;

/// Length of generated transaction ids (hex digits).
pub const TRANSACTION_ID_LEN: usize = 16;

/// Generates a random transaction id of [`TRANSACTION_ID_LEN`] hex digits.
pub fn new_transaction_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(TRANSACTION_ID_LEN);
    id
}

/// Builds the body record for a message.
///
/// The content type essence is taken from the `Content-Type` header value.
/// XML and JSON bodies are validated: a syntax error sets `error` and the
/// byte offset of the error (for XML, the start of the offending line).
/// Urlencoded bodies get their form fields parsed.
///
/// # Arguments
///
/// * `content_type` - The raw `Content-Type` header value, empty if absent
/// * `body` - Body bytes
///
/// # Examples
///
/// ```
/// use txn_inspector::builder::make_body;
///
/// let body = make_body("application/json; charset=utf-8", br#"{"a": tru}"#);
/// assert_eq!(body.content_type, "application/json");
/// assert!(body.error.is_some());
/// assert!(body.error_offset >= 6);
/// ```
pub fn make_body(content_type: &str, body: &[u8]) -> BodyRecord {
    let mut record = BodyRecord {
        raw_content_type: content_type.to_string(),
        text: BodyText::Encoded(encode_base64(body)),
        length: body.len(),
        ..Default::default()
    };

    if content_type.is_empty() {
        return record;
    }
    record.content_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    match essence(content_type).as_str() {
        "application/xml" | "text/xml" => {
            if let Err(e) = check_xml(&String::from_utf8_lossy(body)) {
                record.error = Some(e.to_string());
                record.error_offset = offset_for_line(body, e.line) as i64;
            }
        }
        "application/json" => {
            if let Err(e) = check_json(body) {
                record.error = Some(e.message);
                record.error_offset = e.offset as i64;
            }
        }
        FORM_URLENCODED => match parse_form(body) {
            Ok(fields) => record.form_fields = fields,
            Err(message) => record.error = Some(message),
        },
        _ => {}
    }

    record
}

/// Byte offset of the start of a 1-based line.
fn offset_for_line(body: &[u8], line: usize) -> usize {
    body.split_inclusive(|&b| b == b'\n')
        .take(line.saturating_sub(1))
        .map(<[u8]>::len)
        .sum()
}

/// Parses an urlencoded form, joining repeated keys.
///
/// Fails on a malformed percent escape.
fn parse_form(body: &[u8]) -> Result<BTreeMap<String, String>, String> {
    if let Some(bad) = invalid_escape(body) {
        return Err(format!("invalid URL escape {:?}", bad));
    }

    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for (key, value) in form_urlencoded::parse(body) {
        fields
            .entry(key.into_owned())
            .and_modify(|joined| {
                joined.push_str(FORM_VALUE_SEPARATOR);
                joined.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    Ok(fields)
}

/// Finds the first `%` not followed by two hex digits.
fn invalid_escape(body: &[u8]) -> Option<String> {
    body.iter().enumerate().find_map(|(i, &b)| {
        if b != b'%' {
            return None;
        }
        let escape = &body[i..(i + 3).min(body.len())];
        let valid = escape.len() == 3 && escape[1..].iter().all(u8::is_ascii_hexdigit);
        (!valid).then(|| String::from_utf8_lossy(escape).into_owned())
    })
}

fn header_map(headers: &[(String, String)]) -> ValueMap {
    let mut map = ValueMap::new();
    for (name, value) in headers {
        map.entry(name.clone()).or_default().push(value.clone());
    }
    map
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> &'a str {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

fn write_wire(start_line: &str, headers: &[(String, String)], body: &[u8]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(start_line.len() + body.len() + 64);
    wire.extend_from_slice(start_line.as_bytes());
    wire.extend_from_slice(b"\r\n");
    for (name, value) in headers {
        wire.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
    }
    wire.extend_from_slice(b"\r\n");
    wire.extend_from_slice(body);
    wire
}

/// A captured HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedRequest {
    pub method: String,
    /// Request target, path plus optional query.
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// The request as it appeared on the wire.
    pub fn to_wire(&self) -> Vec<u8> {
        let start_line = format!("{} {} HTTP/1.1", self.method, self.uri);
        write_wire(&start_line, &self.headers, &self.body)
    }

    /// Serializes the request side of a transaction.
    pub fn to_message(&self) -> MessageRecord {
        let wire = self.to_wire();
        let (path, query) = self.uri.split_once('?').unwrap_or((self.uri.as_str(), ""));

        let mut params = ValueMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            params
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }

        MessageRecord {
            raw_encoded: Some(encode_base64(&wire)),
            is_binary: std::str::from_utf8(&wire).is_err(),
            method_path: Some(format!("{} {}", self.method, path)),
            params,
            header: header_map(&self.headers),
            body: make_body(header_value(&self.headers, "Content-Type"), &self.body),
            ..Default::default()
        }
    }
}

/// A captured HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Status line without the protocol, e.g. `"404 Not Found"`.
    pub fn status_line(&self) -> String {
        format!("{} {}", self.status, self.reason)
    }

    /// The response as it appeared on the wire.
    pub fn to_wire(&self) -> Vec<u8> {
        let start_line = format!("HTTP/1.1 {}", self.status_line());
        write_wire(&start_line, &self.headers, &self.body)
    }

    /// Serializes the response side of a transaction.
    pub fn to_message(&self) -> MessageRecord {
        let wire = self.to_wire();
        MessageRecord {
            raw_encoded: Some(encode_base64(&wire)),
            is_binary: std::str::from_utf8(&wire).is_err(),
            status_code: Some(self.status_line()),
            header: header_map(&self.headers),
            body: make_body(header_value(&self.headers, "Content-Type"), &self.body),
            ..Default::default()
        }
    }
}

/// One complete captured exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedExchange {
    pub request: CapturedRequest,
    pub response: CapturedResponse,
    /// Capture time, unix seconds.
    pub start: i64,
    pub duration: Duration,
    /// Tunnel/connection context, passed through to the record.
    pub conn_ctx: Value,
}

impl CapturedExchange {
    pub fn new(request: CapturedRequest, response: CapturedResponse) -> Self {
        Self {
            request,
            response,
            start: 0,
            duration: Duration::ZERO,
            conn_ctx: Value::Null,
        }
    }

    /// Serializes the exchange under a fresh id.
    pub fn to_record(&self) -> TransactionRecord {
        self.to_record_with_id(new_transaction_id())
    }

    /// Serializes the exchange under the given id.
    pub fn to_record_with_id(&self, id: impl Into<String>) -> TransactionRecord {
        TransactionRecord {
            id: id.into(),
            duration_nanos: i64::try_from(self.duration.as_nanos()).unwrap_or(i64::MAX),
            start: self.start,
            conn_ctx: self.conn_ctx.clone(),
            request: self.request.to_message(),
            response: self.response.to_message(),
            formatted_duration: None,
            processed: false,
        }
    }
}
