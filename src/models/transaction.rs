//! Transaction data model and the initial batch payload.

use crate::models::message::MessageRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One captured HTTP exchange.
///
/// Created by deserializing the backend's JSON, then mutated in place by the
/// store the first time it is activated. The `processed` flag is never read
/// from the wire, so every deserialized record starts unprocessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Opaque unique identifier.
    #[serde(rename = "Id")]
    pub id: String,

    /// Elapsed time for the exchange in nanoseconds.
    #[serde(rename = "Duration")]
    pub duration_nanos: i64,

    /// Capture time in unix seconds, `0` when unknown.
    #[serde(rename = "Start", default)]
    pub start: i64,

    /// Tunnel/connection context, passed through untouched.
    #[serde(rename = "ConnCtx", default, skip_serializing_if = "Value::is_null")]
    pub conn_ctx: Value,

    #[serde(rename = "Req")]
    pub request: MessageRecord,

    #[serde(rename = "Resp")]
    pub response: MessageRecord,

    /// Human-readable duration, filled in when the record enters the store.
    #[serde(
        rename = "FormattedDuration",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub formatted_duration: Option<String>,

    #[serde(skip)]
    pub(crate) processed: bool,
}

impl TransactionRecord {
    /// Returns true once the record has been decoded and formatted.
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Parses a single serialized record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// One-line description: `"GET /path 200 OK 1.50ms"`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3);
        parts.push(self.request.method_path.as_deref().unwrap_or("-"));
        parts.push(self.response.status_code.as_deref().unwrap_or("-"));
        if let Some(duration) = self.formatted_duration.as_deref() {
            parts.push(duration);
        }
        parts.join(" ")
    }
}

/// UI state sent along with the initial batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UiState {
    #[serde(default, deserialize_with = "crate::models::serde_helpers::nullable")]
    pub tunnels: Vec<Value>,
}

/// The initial batch of transactions supplied at startup.
///
/// Accepts either a bare JSON array of records or the backend's page payload
/// `{"Txns": [...], "UiState": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitialPayload {
    #[serde(default, deserialize_with = "crate::models::serde_helpers::nullable")]
    pub txns: Vec<TransactionRecord>,

    #[serde(default)]
    pub ui_state: UiState,
}

impl InitialPayload {
    /// Parses an initial batch in either accepted shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        // Parsed through `Value` rather than an untagged enum: buffered
        // untagged content loses arbitrary-precision numbers.
        let value: Value = serde_json::from_str(json)?;
        if value.is_array() {
            Ok(Self {
                txns: serde_json::from_value(value)?,
                ui_state: UiState::default(),
            })
        } else {
            serde_json::from_value(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{
        "Id": "abc123",
        "Duration": 1500000,
        "Start": 1700000000,
        "ConnCtx": {"Tunnel": {"PublicUrl": "http://x.example.com"}},
        "Req": {"MethodPath": "GET /users", "Body": {}},
        "Resp": {"Status": "200 OK", "Body": {}}
    }"#;

    #[test]
    fn test_record_deserializes() {
        let txn = TransactionRecord::from_json(RECORD).unwrap();
        assert_eq!(txn.id, "abc123");
        assert_eq!(txn.duration_nanos, 1_500_000);
        assert_eq!(txn.start, 1_700_000_000);
        assert!(!txn.is_processed());
        assert!(txn.formatted_duration.is_none());
    }

    #[test]
    fn test_processed_flag_ignored_on_input() {
        let json = r#"{"Id": "a", "Duration": 1, "processed": true, "Req": {}, "Resp": {}}"#;
        let txn = TransactionRecord::from_json(json).unwrap();
        assert!(!txn.is_processed());
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let json = r#"{"Id": "a", "Duration": 1, "Req": {}}"#;
        assert!(TransactionRecord::from_json(json).is_err());
    }

    #[test]
    fn test_summary() {
        let mut txn = TransactionRecord::from_json(RECORD).unwrap();
        assert_eq!(txn.summary(), "GET /users 200 OK");
        txn.formatted_duration = Some("1.50ms".to_string());
        assert_eq!(txn.summary(), "GET /users 200 OK 1.50ms");
    }

    #[test]
    fn test_initial_payload_array() {
        let json = format!("[{}]", RECORD);
        let payload = InitialPayload::from_json(&json).unwrap();
        assert_eq!(payload.txns.len(), 1);
        assert!(payload.ui_state.tunnels.is_empty());
    }

    #[test]
    fn test_initial_payload_page_object() {
        let json = format!(
            r#"{{"Txns": [{}], "UiState": {{"Tunnels": [{{"PublicUrl": "http://x"}}]}}}}"#,
            RECORD
        );
        let payload = InitialPayload::from_json(&json).unwrap();
        assert_eq!(payload.txns.len(), 1);
        assert_eq!(payload.ui_state.tunnels.len(), 1);
    }

    #[test]
    fn test_initial_payload_null_txns() {
        let payload = InitialPayload::from_json(r#"{"Txns": null}"#).unwrap();
        assert!(payload.txns.is_empty());
    }
}
