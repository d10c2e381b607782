//! Error type shared by rendering and delivery.

/// Errors that can occur during notification delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
