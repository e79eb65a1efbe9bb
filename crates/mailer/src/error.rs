//! Error types for the mailer crate.

use thiserror::Error;

/// Result type alias for mailer operations.
pub type Result<T> = std::result::Result<T, MailerError>;

/// Errors that can occur while talking to the email provider.
#[derive(Debug, Error)]
pub enum MailerError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error response from the provider
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Sender misconfiguration (bad key, no recipients, ...)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MailerError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }
}

impl From<MailerError> for taxdesk_core::Error {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::InvalidConfig(message) => taxdesk_core::Error::InvalidConfigValue(message),
            other => taxdesk_core::Error::Email(other.to_string()),
        }
    }
}
