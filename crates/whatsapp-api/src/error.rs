//! Error types for the WhatsApp API clients.

use thiserror::Error;

/// Errors that can occur when talking to the WhatsApp channel or catalog API.
#[derive(Debug, Error)]
pub enum WhatsAppError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the remote API.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Missing or invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request itself was invalid before sending.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
