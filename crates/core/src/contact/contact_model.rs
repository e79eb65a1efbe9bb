use serde::{Deserialize, Serialize};

use crate::constants::CONTACT_MAX_MESSAGE_CHARS;
use crate::errors::{Result, ValidationError};
use crate::users::normalize_email;

const MAX_NAME_CHARS: usize = 200;

/// Message submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    /// Trims the fields and checks them; returns the cleaned request.
    pub fn validated(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(ValidationError::InvalidInput(format!(
                "Name must be at most {} characters",
                MAX_NAME_CHARS
            ))
            .into());
        }

        let email = normalize_email(&self.email)?;

        let message = self.message.trim().to_string();
        if message.is_empty() {
            return Err(ValidationError::MissingField("message".to_string()).into());
        }
        if message.chars().count() > CONTACT_MAX_MESSAGE_CHARS {
            return Err(ValidationError::InvalidInput(format!(
                "Message must be at most {} characters",
                CONTACT_MAX_MESSAGE_CHARS
            ))
            .into());
        }

        Ok(Self {
            name,
            email,
            message,
        })
    }
}
