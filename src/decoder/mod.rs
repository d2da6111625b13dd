//! Wire decoding for captured messages.
//!
//! Turns the base64 fields of a [`MessageRecord`] into the views the
//! inspector shows: a hex dump and raw text of the full wire message, and
//! the plain text of the body.

pub mod hexdump;

pub use hexdump::hex_dump;

use crate::models::{BodyText, MessageRecord};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fmt;

/// Errors that can occur while decoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A field that should hold base64 could not be decoded.
    InvalidBase64 {
        /// Wire name of the offending field (`Raw` or `Body.Text`).
        field: &'static str,
        /// Decoder diagnostic.
        reason: String,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidBase64 { field, reason } => {
                write!(f, "Invalid base64 in {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes standard, padded base64.
pub fn decode_base64(field: &'static str, encoded: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| DecodeError::InvalidBase64 {
            field,
            reason: e.to_string(),
        })
}

/// Encodes bytes as standard, padded base64.
pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes a message in place.
///
/// - If the raw message is present and has not been expanded yet, derives
///   `hex_dump`, plus `raw_text` unless the message is binary.
/// - If the body text is still encoded, decodes it; binary bodies become
///   the empty string.
///
/// Every field is decoded before anything is written, so on error the
/// message is left exactly as it was.
///
/// # Arguments
///
/// * `message` - The message to decode
///
/// # Returns
///
/// `Ok(())` on success, or `Err(DecodeError)` when a base64 field is
/// malformed.
pub fn decode_message(message: &mut MessageRecord) -> Result<(), DecodeError> {
    let raw_views = match (&message.raw_encoded, message.is_expanded()) {
        (Some(encoded), false) => {
            let bytes = decode_base64("Raw", encoded)?;
            let text = if message.is_binary {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).into_owned())
            };
            Some((hex_dump(&bytes), text))
        }
        _ => None,
    };

    let body_text = match &message.body.text {
        BodyText::Encoded(_) if message.is_binary => Some(String::new()),
        BodyText::Encoded(encoded) => {
            let bytes = decode_base64("Body.Text", encoded)?;
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        BodyText::Decoded(_) | BodyText::Rendered(_) => None,
    };

    if let Some((dump, text)) = raw_views {
        message.hex_dump = Some(dump);
        message.raw_text = text;
    }
    if let Some(text) = body_text {
        message.body.text = BodyText::Decoded(text);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BodyRecord;

    fn message(raw: &[u8], body: &[u8], binary: bool) -> MessageRecord {
        MessageRecord {
            raw_encoded: Some(encode_base64(raw)),
            is_binary: binary,
            body: BodyRecord {
                text: BodyText::Encoded(encode_base64(body)),
                length: body.len(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_text_message() {
        let mut msg = message(b"POST / HTTP/1.1\r\n\r\nhello", b"hello", false);
        decode_message(&mut msg).unwrap();

        assert_eq!(msg.raw_text.as_deref(), Some("POST / HTTP/1.1\r\n\r\nhello"));
        assert!(msg.hex_dump.as_deref().unwrap().starts_with("50 4f 53 54 "));
        assert_eq!(msg.body.text, BodyText::Decoded("hello".to_string()));
    }

    #[test]
    fn test_decode_binary_message() {
        let mut msg = message(&[0xff, 0x00, 0x10], &[0xff, 0x00], true);
        decode_message(&mut msg).unwrap();

        assert!(msg.raw_text.is_none());
        assert_eq!(
            msg.hex_dump.as_deref(),
            Some("ff 00 10                \t. . . ")
        );
        assert_eq!(msg.body.text, BodyText::Decoded(String::new()));
    }

    #[test]
    fn test_decode_without_raw() {
        let mut msg = message(b"", b"{}", false);
        msg.raw_encoded = None;
        decode_message(&mut msg).unwrap();

        assert!(msg.hex_dump.is_none());
        assert_eq!(msg.body.text, BodyText::Decoded("{}".to_string()));
    }

    #[test]
    fn test_decode_keeps_existing_expansion() {
        let mut msg = message(b"abc", b"", false);
        msg.hex_dump = Some("precomputed".to_string());
        decode_message(&mut msg).unwrap();

        assert_eq!(msg.hex_dump.as_deref(), Some("precomputed"));
        assert!(msg.raw_text.is_none());
    }

    #[test]
    fn test_malformed_raw_leaves_message_untouched() {
        let mut msg = message(b"abc", b"body", false);
        msg.raw_encoded = Some("not base64!!".to_string());
        let before = msg.clone();

        let err = decode_message(&mut msg).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidBase64 { field: "Raw", .. }));
        assert_eq!(msg, before);
    }

    #[test]
    fn test_malformed_body_leaves_message_untouched() {
        let mut msg = message(b"abc", b"", false);
        msg.body.text = BodyText::Encoded("%%%".to_string());
        let before = msg.clone();

        let err = decode_message(&mut msg).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidBase64 {
                field: "Body.Text",
                ..
            }
        ));
        assert_eq!(msg, before);
    }

    #[test]
    fn test_decoded_body_is_not_decoded_twice() {
        let mut msg = message(b"", b"aGk=", false);
        decode_message(&mut msg).unwrap();
        assert_eq!(msg.body.text, BodyText::Decoded("aGk=".to_string()));

        decode_message(&mut msg).unwrap();
        assert_eq!(msg.body.text, BodyText::Decoded("aGk=".to_string()));
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::InvalidBase64 {
            field: "Raw",
            reason: "Invalid byte 33, offset 0.".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid base64 in Raw: Invalid byte 33, offset 0."
        );
    }
}
