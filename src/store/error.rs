//! Transaction store error types.

use crate::decoder::DecodeError;
use crate::formatter::FormatError;
use std::fmt;

/// Errors raised by store operations.
///
/// Every error concerns a single record; the rest of the store is never
/// affected by it.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Input JSON could not be parsed into a transaction record.
    ///
    /// Covers both malformed JSON and records missing a required field.
    MalformedRecord(String),

    /// A streamed record reused the id of a record already in the store.
    DuplicateTransaction(String),

    /// No record with the given id is in the store.
    UnknownTransaction(String),

    /// A base64 field of the record could not be decoded.
    ///
    /// The record stays unprocessed.
    Decode {
        id: String,
        source: DecodeError,
    },

    /// A body of the record could not be formatted.
    Format {
        id: String,
        source: FormatError,
    },
}

impl StoreError {
    /// Returns the id of the record the error concerns, when known.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            StoreError::MalformedRecord(_) => None,
            StoreError::DuplicateTransaction(id)
            | StoreError::UnknownTransaction(id)
            | StoreError::Decode { id, .. }
            | StoreError::Format { id, .. } => Some(id),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::MalformedRecord(msg) => write!(f, "Malformed transaction record: {}", msg),
            StoreError::DuplicateTransaction(id) => write!(f, "Duplicate transaction: {}", id),
            StoreError::UnknownTransaction(id) => write!(f, "Unknown transaction: {}", id),
            StoreError::Decode { id, source } => {
                write!(f, "Failed to decode transaction {}: {}", id, source)
            }
            StoreError::Format { id, source } => {
                write!(f, "Failed to format transaction {}: {}", id, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Decode { source, .. } => Some(source),
            StoreError::Format { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convert JSON parse errors to StoreError.
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::MalformedRecord(err.to_string())
    }
}
