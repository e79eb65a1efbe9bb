use serde::{Deserialize, Serialize};

/// A single outbound email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

/// Addresses used for staff-facing emails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminRecipients {
    pub from: String,
    pub to: Vec<String>,
}

impl AdminRecipients {
    pub fn new(from: impl Into<String>, to: Vec<String>) -> Self {
        Self {
            from: from.into(),
            to,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty()
    }
}
