//! The replay command.
//!
//! Asks the capturing backend to send a captured request again. The command
//! is a form POST to [`REPLAY_PATH`] carrying the transaction id; its response
//! is never fed back into the pipeline.

#[cfg(feature = "live")]
mod client;

#[cfg(feature = "live")]
pub use client::ReplayClient;

use crate::formatter::content_type::FORM_URLENCODED;
use std::fmt;
use url::form_urlencoded;
use url::Url;

/// Path of the backend's replay endpoint.
pub const REPLAY_PATH: &str = "/http/in/replay";

/// Form parameter carrying the transaction id.
pub const TXN_ID_PARAM: &str = "txnid";

/// Errors that can occur while sending a replay command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The backend base URL could not be parsed.
    InvalidUrl(String),

    /// The request could not be delivered.
    NetworkError(String),

    /// The backend answered with a non-success status.
    Rejected(u16),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ReplayError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ReplayError::Rejected(status) => {
                write!(f, "Replay rejected with status {}", status)
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Convert URL parsing errors to ReplayError.
impl From<url::ParseError> for ReplayError {
    fn from(err: url::ParseError) -> Self {
        ReplayError::InvalidUrl(err.to_string())
    }
}

/// A replay command for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayRequest {
    pub txn_id: String,
}

impl ReplayRequest {
    pub fn new(txn_id: impl Into<String>) -> Self {
        Self {
            txn_id: txn_id.into(),
        }
    }

    /// HTTP method of the command.
    pub fn method(&self) -> &'static str {
        "POST"
    }

    /// Content type of [`ReplayRequest::form_body`].
    pub fn content_type(&self) -> &'static str {
        FORM_URLENCODED
    }

    /// Urlencoded form body, e.g. `txnid=abc123`.
    ///
    /// # Examples
    ///
    /// ```
    /// use txn_inspector::replay::ReplayRequest;
    ///
    /// assert_eq!(ReplayRequest::new("a b&c").form_body(), "txnid=a+b%26c");
    /// ```
    pub fn form_body(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair(TXN_ID_PARAM, &self.txn_id)
            .finish()
    }

    /// Resolves the replay endpoint against the backend's base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use txn_inspector::replay::ReplayRequest;
    ///
    /// let url = ReplayRequest::new("x").url("http://127.0.0.1:4040").unwrap();
    /// assert_eq!(url.as_str(), "http://127.0.0.1:4040/http/in/replay");
    /// ```
    pub fn url(&self, base_url: &str) -> Result<Url, ReplayError> {
        Ok(Url::parse(base_url)?.join(REPLAY_PATH)?)
    }
}
