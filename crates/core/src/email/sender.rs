//! Email sender trait and implementations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use super::EmailMessage;
use crate::errors::{Error, Result};

/// Trait for dispatching emails.
///
/// A returned `Ok` means the provider accepted the message; nothing is
/// retried by callers.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// Sender used when no email provider is configured. Logs and succeeds.
#[derive(Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        log::info!(
            "Email provider not configured; dropping '{}' to {:?}",
            message.subject,
            message.to
        );
        Ok(())
    }
}

/// Mock sender for testing - collects sent messages and can be told to fail.
#[derive(Clone, Default)]
pub struct MockEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail: Arc<AtomicBool>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent sends fail (true) or succeed (false).
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Returns all successfully sent messages.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of successfully sent messages.
    pub fn len(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing has been sent.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Email("mock provider rejected the message".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }
}
