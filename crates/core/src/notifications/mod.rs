//! Notifications module - the admin notification endpoint.
//!
//! A batch of section edits reported by a client becomes at most one email to
//! the firm's staff. The per-profile idempotency marker suppresses duplicate
//! deliveries of the same batch id.

mod notification_model;
mod notification_payload;
mod notification_service;


pub use notification_model::{BatchNotificationRequest, BatchOutcome};
pub use notification_payload::build_profile_update_email;
pub use notification_service::{NotificationService, NotificationServiceTrait};
