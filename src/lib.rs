//! Rendering pipeline for a live HTTP transaction inspector
//!
//! A capturing backend records HTTP exchanges flowing through a tunnel and
//! pushes them to the inspector as JSON transaction records. This crate turns
//! those records into something a person can read: decoded bodies, hex dumps,
//! pretty-printed and highlighted payloads, status classes and human-readable
//! durations, plus the in-memory store that holds them and the replay command
//! that sends a captured request again.
//!
//! # Architecture
//!
//! - **models**: Transaction, message and body records in their wire shape
//! - **decoder**: Base64 decoding, hex dumps and raw text views
//! - **formatter**: Content type classification, pretty printing, syntax
//!   highlighting, error markers and metadata formatting
//! - **store**: The ordered transaction store, lazy processing on activation
//!   and the event loop that feeds it
//! - **replay**: The replay command and (with the `live` feature) its client
//! - **builder**: Serializes captured exchanges into transaction records
//! - **config**: Inspector settings
//!
//! # Pipeline
//!
//! Records enter the store untouched. The first time a record is activated
//! it is processed exactly once:
//! 1. The raw wire message and the body text are decoded from base64
//! 2. The raw message gets a hex dump and, when not binary, a text view
//! 3. The body is classified by content type, pretty-printed when valid,
//!    highlighted and escaped
//! 4. A reported body parse error is located within the highlighted output
//!
//! # Example
//!
//! ```
//! use txn_inspector::builder::{CapturedExchange, CapturedRequest, CapturedResponse};
//! use txn_inspector::store::TransactionStore;
//!
//! let exchange = CapturedExchange::new(
//!     CapturedRequest::new("GET", "/users?page=2"),
//!     CapturedResponse::new(200, "OK")
//!         .header("Content-Type", "application/json")
//!         .body(r#"{"users":[]}"#),
//! );
//! let json = serde_json::to_string(&exchange.to_record_with_id("abc")).unwrap();
//!
//! let mut store = TransactionStore::default();
//! store.add_streamed(&json).unwrap();
//!
//! let active = store.get_active().unwrap();
//! assert!(active.is_processed());
//! assert!(active.response.body.text.as_str().contains("hljs-attr"));
//! ```

pub mod builder;
pub mod config;
pub mod decoder;
pub mod formatter;
pub mod models;
pub mod replay;
pub mod store;

pub use config::InspectorConfig;
pub use formatter::{classify_and_format, FormatError, FormatOptions};
pub use models::{BodyRecord, BodyText, MessageRecord, TransactionRecord};
pub use replay::{ReplayError, ReplayRequest};
pub use store::{process_transaction, Inspector, InspectorEvent, StoreError, TransactionStore};
