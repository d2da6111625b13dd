//! End-to-end tests from captured exchange to rendered record.
//!
//! Each test builds an exchange, serializes it the way the backend does,
//! loads it into a store and checks what the activated record looks like.

use super::{init_test_env, json_exchange, serialized};
use txn_inspector::builder::{CapturedExchange, CapturedRequest, CapturedResponse};
use txn_inspector::formatter::{FormatOptions, StatusClass, SyntaxClass};
use txn_inspector::store::TransactionStore;
use txn_inspector::{BodyText, InspectorConfig, TransactionRecord};

fn activate(exchange: &CapturedExchange) -> TransactionRecord {
    init_test_env();
    let mut store = TransactionStore::default();
    store
        .add_streamed(&serialized(exchange, "t1"))
        .expect("Failed to add record");
    store.get_active().cloned().expect("No active record")
}

#[test]
fn test_json_exchange_is_fully_processed() {
    let txn = activate(&json_exchange(200, "OK", r#"{"items":[1,2],"next":null}"#));

    assert!(txn.is_processed());
    assert_eq!(txn.formatted_duration.as_deref(), Some("2.34ms"));
    assert_eq!(txn.response.status_class, Some(StatusClass::Info));
    assert_eq!(txn.summary(), "GET /api/items 200 OK 2.34ms");

    let raw = txn.request.raw_text.as_deref().unwrap();
    assert!(raw.starts_with("GET /api/items?page=1&sort=name HTTP/1.1\r\n"));
    let dump = txn.request.hex_dump.as_deref().unwrap();
    assert!(dump.starts_with("47 45 54 20 2f 61 70 69 \tG E T   / a p i \n"));

    let body = &txn.response.body;
    assert_eq!(body.syntax_class, SyntaxClass::Json);
    assert!(body.has_content);
    assert!(!body.has_error);
    let text = body.text.as_str();
    assert!(text.contains("\n    <span class=\"hljs-attr\">\"items\"</span>"));
    assert!(text.contains("<span class=\"hljs-literal\">null</span>"));
}

#[test]
fn test_status_classes() {
    let cases = [
        (204, "No Content", Some(StatusClass::Info)),
        (304, "Not Modified", Some(StatusClass::Neutral)),
        (404, "Not Found", Some(StatusClass::Warning)),
        (503, "Service Unavailable", Some(StatusClass::Error)),
        (101, "Switching Protocols", None),
    ];
    for (status, reason, expected) in cases {
        let txn = activate(&json_exchange(status, reason, "{}"));
        assert_eq!(txn.response.status_class, expected, "status {}", status);
    }
}

#[test]
fn test_malformed_xml_keeps_layout_and_marks_error() {
    let body = "<root>\n<a>\n</b>\n</root>";
    let exchange = CapturedExchange::new(
        CapturedRequest::new("POST", "/soap")
            .header("Content-Type", "text/xml")
            .body(body),
        CapturedResponse::new(500, "Internal Server Error"),
    );
    let txn = activate(&exchange);
    let request_body = &txn.request.body;

    assert!(request_body.has_error);
    assert_eq!(request_body.error_offset, 11);
    assert!(request_body
        .error
        .as_deref()
        .unwrap()
        .contains("element <a> closed by </b>"));

    // Not re-indented.
    let text = request_body.text.as_str();
    assert!(!text.contains("\n "));
    assert_eq!(text.matches('\n').count(), 3);
    let marker = request_body.error_marker.as_ref().expect("No error marker");
    assert!(marker.start <= 11 && 11 < marker.end);
}

#[test]
fn test_form_body_is_escaped_without_highlighting() {
    let exchange = CapturedExchange::new(
        CapturedRequest::new("POST", "/login")
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("user=a%3Cb%3E&remember=on"),
        CapturedResponse::new(302, "Found"),
    );
    let txn = activate(&exchange);
    let body = &txn.request.body;

    assert!(body.is_form);
    assert_eq!(body.form_fields.get("user").map(String::as_str), Some("<b>"));
    assert_eq!(body.text.as_str(), "user=a%3Cb%3E&amp;remember=on");
    assert!(!body.text.as_str().contains("<span"));
}

#[test]
fn test_html_is_escaped_but_not_reindented() {
    let exchange = CapturedExchange::new(
        CapturedRequest::new("GET", "/"),
        CapturedResponse::new(200, "OK")
            .header("Content-Type", "text/html; charset=utf-8")
            .body("<html><body><p>Hi & bye</p></body></html>"),
    );
    let txn = activate(&exchange);
    let text = txn.response.body.text.as_str();

    assert_eq!(txn.response.body.syntax_class, SyntaxClass::Xml);
    assert!(!text.contains('\n'));
    assert!(!text.contains("<p>"));
    assert!(text.contains("&amp; bye"));
}

#[test]
fn test_binary_response_has_hex_dump_only() {
    let exchange = CapturedExchange::new(
        CapturedRequest::new("GET", "/logo.png"),
        CapturedResponse::new(200, "OK")
            .header("Content-Type", "image/png")
            .body(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff]),
    );
    let txn = activate(&exchange);

    assert!(txn.response.is_binary);
    assert!(txn.response.raw_text.is_none());
    assert!(txn.response.hex_dump.as_deref().unwrap().contains("89 50 4e 47"));
    assert_eq!(txn.response.body.text, BodyText::Rendered(String::new()));
    assert!(txn.response.body.has_content);
}

#[test]
fn test_options_from_config_disable_pretty_print() {
    init_test_env();
    let config = InspectorConfig {
        pretty_print: false,
        ..Default::default()
    };
    let mut store = TransactionStore::new(FormatOptions::from(&config));
    store
        .add_streamed(&serialized(&json_exchange(200, "OK", r#"{"a":1}"#), "t1"))
        .unwrap();

    let text = store.get_active().unwrap().response.body.text.as_str().to_string();
    assert!(!text.contains('\n'));
    assert!(text.contains("<span class=\"hljs-attr\">\"a\"</span>"));
}
