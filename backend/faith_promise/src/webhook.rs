//! Webhook sink. POSTs each pledge as JSON to a spreadsheet endpoint.
//!
//! ## Resilience
//!
//! * Transport errors, `429 Too Many Requests` and `5xx` responses are retried
//!   with exponential back-off, up to `max_retries` extra attempts.
//! * Any other non-success status is a rejection and is not retried.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::errors::SubmissionError;
use crate::form::PledgeRecord;
use crate::sink::SubmissionSink;

const MAX_BACKOFF: Duration = Duration::from_secs(30);
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl WebhookSink {
    pub fn new(client: Client, url: impl Into<String>, max_retries: u32) -> Self {
        Self {
            client,
            url: url.into(),
            max_retries,
            initial_backoff: INITIAL_BACKOFF,
        }
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }
}

impl SubmissionSink for WebhookSink {
    async fn submit(&self, record: &PledgeRecord) -> Result<(), SubmissionError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let retry_reason = match self.client.post(&self.url).json(record).send().await {
                Err(e) => format!("request failed: {e}"),
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        debug!("Webhook accepted pledge (attempt {attempt}, {status})");
                        return Ok(());
                    }
                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(SubmissionError::Rejected(format!(
                            "{status}: {}",
                            body.trim()
                        )));
                    }
                    format!("webhook responded {status}")
                }
            };

            if attempt > self.max_retries {
                return Err(SubmissionError::Unavailable(format!(
                    "{retry_reason} (gave up after {attempt} attempts)"
                )));
            }

            warn!("Webhook {retry_reason} (will retry in {backoff:?})");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }
}
