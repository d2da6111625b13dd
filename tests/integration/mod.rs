//! Integration tests module for the transaction inspector
//!
//! Shared fixtures for building captured exchanges and serializing them the
//! way the capturing backend does.

pub mod pipeline_test;
pub mod stream_test;

use std::sync::Once;
use std::time::Duration;
use txn_inspector::builder::{CapturedExchange, CapturedRequest, CapturedResponse};

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        txn_inspector::config::reset_config();
    });
}

/// A JSON API call with the given response body.
pub fn json_exchange(status: u16, reason: &str, body: &str) -> CapturedExchange {
    let mut exchange = CapturedExchange::new(
        CapturedRequest::new("GET", "/api/items?page=1&sort=name")
            .header("Host", "api.example.com")
            .header("Accept", "application/json"),
        CapturedResponse::new(status, reason)
            .header("Content-Type", "application/json; charset=utf-8")
            .body(body),
    );
    exchange.start = 1_700_000_000;
    exchange.duration = Duration::from_micros(2_340);
    exchange
}

/// Serializes an exchange under a fixed id.
pub fn serialized(exchange: &CapturedExchange, id: &str) -> String {
    serde_json::to_string(&exchange.to_record_with_id(id)).expect("Failed to serialize record")
}
