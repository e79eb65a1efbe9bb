//! User domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::errors::{Result, ValidationError};

/// Domain model representing a registered user.
///
/// The password hash never leaves the server; it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

/// Credentials submitted at registration or login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
}

impl RegisterUser {
    /// Validates the credentials and returns the normalized email.
    pub fn validate(&self) -> Result<String> {
        let email = normalize_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }
        Ok(email)
    }
}

/// Input model for persisting a new user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

/// Trims and lower-cases an email address, rejecting obviously malformed ones.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()).into());
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidInput(format!("Invalid email address: {}", raw)).into());
    }
    Ok(email)
}
