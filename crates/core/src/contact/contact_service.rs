use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info};

use super::contact_model::ContactRequest;
use super::rate_limiter::RateLimiter;
use crate::email::{AdminRecipients, EmailMessage, EmailSender};
use crate::errors::{Error, Result};

/// Trait for contact form operations
#[async_trait]
pub trait ContactServiceTrait: Send + Sync {
    /// Forwards a visitor's message to the staff, at most once per window per client.
    async fn submit(&self, client_key: &str, request: ContactRequest) -> Result<()>;

    /// Drops throttle entries whose window has passed.
    fn evict_expired(&self) -> usize;
}

pub struct ContactService {
    email_sender: Arc<dyn EmailSender>,
    recipients: AdminRecipients,
    limiter: Arc<RateLimiter>,
}

impl ContactService {
    pub fn new(
        email_sender: Arc<dyn EmailSender>,
        recipients: AdminRecipients,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            email_sender,
            recipients,
            limiter,
        }
    }

    fn build_message(&self, request: &ContactRequest) -> EmailMessage {
        EmailMessage {
            from: self.recipients.from.clone(),
            to: self.recipients.to.clone(),
            reply_to: Some(request.email.clone()),
            subject: format!("Contact form: {}", request.name),
            text: format!(
                "Name: {}\nEmail: {}\n\n{}\n",
                request.name, request.email, request.message
            ),
            html: None,
        }
    }
}

#[async_trait]
impl ContactServiceTrait for ContactService {
    async fn submit(&self, client_key: &str, request: ContactRequest) -> Result<()> {
        let request = request.validated()?;

        if self.recipients.is_empty() {
            return Err(Error::InvalidConfigValue(
                "No admin email recipients configured".to_string(),
            ));
        }

        self.limiter.check(client_key).inspect_err(|_| {
            debug!("Contact submission from {} throttled", client_key);
        })?;

        let message = self.build_message(&request);
        if let Err(e) = self.email_sender.send(message).await {
            error!("Failed to forward contact message from {}: {}", client_key, e);
            self.limiter.forget(client_key);
            return Err(e);
        }

        info!("Forwarded contact message from {}", request.email);
        Ok(())
    }

    fn evict_expired(&self) -> usize {
        self.limiter.evict_expired()
    }
}
