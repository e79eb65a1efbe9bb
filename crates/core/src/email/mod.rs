//! Email module.
//!
//! Provides the outbound message type and the sender trait used by the
//! notification endpoint and the contact form. Runtime adapters (the HTTP
//! mailer crate) implement the sender against a transactional email API.

mod email_model;
mod sender;

pub use email_model::*;
pub use sender::*;
