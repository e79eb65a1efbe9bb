use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use super::notification_model::{BatchNotificationRequest, BatchOutcome};
use super::notification_payload::build_profile_update_email;
use crate::email::{AdminRecipients, EmailSender};
use crate::errors::{Error, Result};
use crate::household::HouseholdRepositoryTrait;
use crate::profiles::{BatchClaim, ProfileRepositoryTrait};

/// Trait for the batch notification endpoint.
#[async_trait]
pub trait NotificationServiceTrait: Send + Sync {
    /// Sends at most one staff email per `(user, batch id)`.
    async fn notify_batch(
        &self,
        user_id: &str,
        request: &BatchNotificationRequest,
    ) -> Result<BatchOutcome>;
}

pub struct NotificationService {
    profile_repository: Arc<dyn ProfileRepositoryTrait>,
    household_repository: Arc<dyn HouseholdRepositoryTrait>,
    email_sender: Arc<dyn EmailSender>,
    recipients: AdminRecipients,
}

impl NotificationService {
    pub fn new(
        profile_repository: Arc<dyn ProfileRepositoryTrait>,
        household_repository: Arc<dyn HouseholdRepositoryTrait>,
        email_sender: Arc<dyn EmailSender>,
        recipients: AdminRecipients,
    ) -> Self {
        Self {
            profile_repository,
            household_repository,
            email_sender,
            recipients,
        }
    }

    async fn deliver(
        &self,
        user_id: &str,
        batch_id: &str,
        request: &BatchNotificationRequest,
    ) -> Result<()> {
        let profile = self.profile_repository.get_profile(user_id)?;
        let household = self.household_repository.get_or_create(user_id).await?;
        let message = build_profile_update_email(
            &self.recipients,
            batch_id,
            &request.updated_sections,
            &profile,
            &household,
        );
        self.email_sender.send(message).await
    }

    /// Puts the marker back so a retry with the same id is not suppressed.
    async fn roll_back(&self, user_id: &str, batch_id: &str, previous: Option<String>) {
        match self
            .profile_repository
            .release_notification_batch(user_id, batch_id, previous)
            .await
        {
            Ok(true) => debug!("Released batch {} for user {}", batch_id, user_id),
            Ok(false) => warn!(
                "Batch marker for user {} moved past {} before rollback",
                user_id, batch_id
            ),
            Err(e) => error!(
                "Failed to release batch {} for user {}: {}",
                batch_id, user_id, e
            ),
        }
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn notify_batch(
        &self,
        user_id: &str,
        request: &BatchNotificationRequest,
    ) -> Result<BatchOutcome> {
        let batch_id = request.validated_batch_id()?;

        let previous = match self
            .profile_repository
            .claim_notification_batch(user_id, &batch_id)
            .await?
        {
            BatchClaim::AlreadyProcessed => {
                debug!(
                    "Batch {} already processed for user {}; skipping",
                    batch_id, user_id
                );
                return Ok(BatchOutcome::AlreadyProcessed);
            }
            BatchClaim::Claimed { previous } => previous,
        };

        if self.recipients.is_empty() {
            self.roll_back(user_id, &batch_id, previous).await;
            return Err(Error::InvalidConfigValue(
                "No admin email recipients configured".to_string(),
            ));
        }

        if let Err(e) = self.deliver(user_id, &batch_id, request).await {
            error!(
                "Failed to send notification for batch {} (user {}): {}",
                batch_id, user_id, e
            );
            self.roll_back(user_id, &batch_id, previous).await;
            return Err(Error::Notification(format!(
                "Failed to send notification: {}",
                e
            )));
        }

        info!(
            "Sent profile update notification for user {} (batch {}, sections {:?})",
            user_id, batch_id, request.updated_sections
        );
        Ok(BatchOutcome::Sent)
    }
}
