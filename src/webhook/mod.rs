//! Webhook submission: wire payload and HTTP client.

mod client;
mod payload;

pub use client::{WebhookClient, WebhookError, WEBHOOK_URL_ENV};
pub use payload::{SubmissionPayload, DEFAULT_USER_ID};
