//! HTTP delivery of replay commands.

use super::{ReplayError, ReplayRequest};
use crate::config::InspectorConfig;
use log::{info, warn};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tokio::task::JoinHandle;

const REPLAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Convert reqwest errors to ReplayError.
impl From<reqwest::Error> for ReplayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ReplayError::InvalidUrl(err.to_string())
        } else {
            ReplayError::NetworkError(err.to_string())
        }
    }
}

/// Sends replay commands to the capturing backend.
#[derive(Debug, Clone)]
pub struct ReplayClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReplayClient {
    /// Creates a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ReplayError> {
        let client = reqwest::Client::builder()
            .timeout(REPLAY_TIMEOUT)
            .build()?;
        let base_url = base_url.into();
        ReplayRequest::new("").url(&base_url)?;
        Ok(Self { client, base_url })
    }

    /// Creates a client for the backend configured in `replayBaseUrl`.
    pub fn from_config(config: &InspectorConfig) -> Result<Self, ReplayError> {
        Self::new(config.replay_base_url.clone())
    }

    /// Sends a replay command and waits for the backend's answer.
    ///
    /// # Returns
    ///
    /// The response status code on success, or `Err(ReplayError)` if the
    /// request fails or the backend rejects it.
    pub async fn send(&self, request: &ReplayRequest) -> Result<u16, ReplayError> {
        let url = request.url(&self.base_url)?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.content_type())
            .body(request.form_body())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(ReplayError::Rejected(status.as_u16()))
        }
    }

    /// Sends a replay command on a background task and only logs the result.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn dispatch(&self, request: ReplayRequest) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            match client.send(&request).await {
                Ok(status) => info!("Replayed {} ({})", request.txn_id, status),
                Err(e) => warn!("Replay of {} failed: {}", request.txn_id, e),
            }
        })
    }
}
