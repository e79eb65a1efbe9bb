//! Transactional email sender for Taxdesk.
//!
//! Implements `taxdesk_core::email::EmailSender` on top of a Resend-compatible
//! HTTP API (`POST {base_url}/emails` with a bearer API key).

mod error;
mod resend;

pub use error::{MailerError, Result};
pub use resend::{ResendEmailSender, DEFAULT_API_URL};
