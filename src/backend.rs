use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::REQUEST_TIMEOUT;
use crate::ticket::SubmissionPayload;

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Something that can deliver a ticket to the backend.
pub trait Submit {
    /// Send one payload. Returns the response body on success.
    fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<String, SubmitError>;
}

/// Blocking HTTP client for the ticket endpoint.
#[derive(Debug)]
pub struct BackendClient {
    client: Client,
    url: String,
    timeout: Duration,
}

impl BackendClient {
    pub fn new(url: String) -> Result<Self, SubmitError> {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: String, timeout: Duration) -> Result<Self, SubmitError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SubmitError::Transport)?;
        Ok(BackendClient {
            client,
            url,
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> SubmitError {
        if e.is_timeout() {
            SubmitError::Timeout(self.timeout)
        } else {
            SubmitError::Transport(e)
        }
    }
}

impl Submit for BackendClient {
    #[tracing::instrument(skip_all, fields(barcode = payload.bar_code))]
    fn submit(&self, payload: &SubmissionPayload<'_>) -> Result<String, SubmitError> {
        info!("Sending request to API endpoint: {}", self.url);
        debug!("Request payload: {}", payload.to_log_string());

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().map_err(|e| self.classify(e))?;
        if !status.is_success() {
            return Err(SubmitError::Status { status, body });
        }
        Ok(body)
    }
}
