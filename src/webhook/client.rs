//! WebhookClient - posts submissions to the configured endpoint.

use std::time::Duration;

use super::payload::SubmissionPayload;

/// Environment variable holding the webhook endpoint URL.
///
/// Overrides the config file when set; useful for pointing a deployed
/// binary at a different flow without editing config.
pub const WEBHOOK_URL_ENV: &str = "SHUTTERPOST_WEBHOOK_URL";

/// Timeout for the whole submission request (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the receiving automation flow's webhook.
///
/// One endpoint, one operation: POST the submission payload as JSON.
/// Success is keyed purely on an HTTP-ok status; no response body is
/// consumed on success. Non-success responses surface as
/// [`WebhookError::Rejected`] so the caller can show the user something
/// and keep the gallery for a retry.
pub struct WebhookClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client for the given endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingEndpoint` when the URL is blank,
    /// which is how an unconfigured install shows up.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, WebhookError> {
        let endpoint = endpoint.into();
        if endpoint.trim().is_empty() {
            return Err(WebhookError::MissingEndpoint);
        }

        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Create a client from the `SHUTTERPOST_WEBHOOK_URL` environment
    /// variable.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::MissingEndpoint` when the variable is not
    /// set or blank.
    pub fn from_env() -> Result<Self, WebhookError> {
        let endpoint =
            std::env::var(WEBHOOK_URL_ENV).map_err(|_| WebhookError::MissingEndpoint)?;
        Self::new(endpoint)
    }

    /// The endpoint URL this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the payload to the endpoint as JSON.
    ///
    /// Single request, no retry: the session keeps the gallery on failure
    /// so the user decides whether to resubmit.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::HttpError` when the request itself fails
    /// (connect, timeout, TLS), or `WebhookError::Rejected` when the
    /// endpoint answers with a non-success status.
    pub async fn post_submission(&self, payload: &SubmissionPayload) -> Result<(), WebhookError> {
        log::info!(
            "Submitting {} image(s) for user '{}' to {}",
            payload.images.len(),
            payload.user_id,
            self.endpoint
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::warn!("Webhook rejected submission with status {}", status);
            return Err(WebhookError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Submission accepted ({})", status);
        Ok(())
    }
}

/// Errors from webhook operations.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook endpoint not configured")]
    MissingEndpoint,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Webhook rejected submission with status {status}: {body}")]
    Rejected {
        /// HTTP status code of the rejection
        status: u16,
        /// Response body, for the user-facing error message
        body: String,
    },
}
