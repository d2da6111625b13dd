//! Request and response message data model.

use crate::formatter::metadata::StatusClass;
use crate::models::body::BodyRecord;
use crate::models::serde_helpers::nullable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header or query parameter map, one list of values per name.
pub type ValueMap = BTreeMap<String, Vec<String>>;

/// One side (request or response) of a captured transaction.
///
/// Requests carry `method_path` and `params`; responses carry `status_code`.
/// The decoder fills in `hex_dump` and `raw_text`; the store fills in
/// `status_class` for responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Base64 of the full wire message (request line, headers, body).
    #[serde(rename = "Raw", default, deserialize_with = "nullable")]
    pub raw_encoded: Option<String>,

    /// Declared by the capturer when the wire message is not valid UTF-8.
    #[serde(rename = "Binary", default)]
    pub is_binary: bool,

    /// `"GET /path"` for requests.
    #[serde(
        rename = "MethodPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub method_path: Option<String>,

    /// Query parameters for requests.
    #[serde(
        rename = "Params",
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub params: ValueMap,

    /// Status line for responses, e.g. `"404 Not Found"`.
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,

    #[serde(rename = "Header", default, deserialize_with = "nullable")]
    pub header: ValueMap,

    #[serde(rename = "Body", default)]
    pub body: BodyRecord,

    /// Hex dump of the raw message.
    #[serde(rename = "RawBytes", default, skip_serializing_if = "Option::is_none")]
    pub hex_dump: Option<String>,

    /// Raw message as text, absent for binary messages.
    #[serde(rename = "RawText", default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,

    #[serde(
        rename = "statusClass",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    pub status_class: Option<StatusClass>,
}

impl MessageRecord {
    /// Returns true once the raw views have been derived.
    pub fn is_expanded(&self) -> bool {
        self.hex_dump.is_some()
    }

    /// Gets the first value of a header, matching the name case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.header
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}
