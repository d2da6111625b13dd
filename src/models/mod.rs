//! Core data models for captured HTTP transactions.
//!
//! Records are deserialized from the JSON produced by the capturing backend,
//! so field names on the wire follow its PascalCase convention (`Id`, `Req`,
//! `Resp`, `Body`, ...). Fields derived by the pipeline are serialized under
//! their own names and are never required on input.

pub mod body;
pub mod message;
pub mod serde_helpers;
pub mod transaction;

pub use body::{BodyRecord, BodyText};
pub use message::MessageRecord;
pub use transaction::{InitialPayload, TransactionRecord, UiState};
