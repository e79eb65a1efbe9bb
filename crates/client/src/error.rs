//! Error types for the client crate.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while calling the Taxdesk API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the server
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The transport was created outside a Tokio runtime
    #[error("No Tokio runtime available: {0}")]
    NoRuntime(String),
}

impl ClientError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<ClientError> for taxdesk_core::Error {
    fn from(err: ClientError) -> Self {
        taxdesk_core::Error::Transport(err.to_string())
    }
}
