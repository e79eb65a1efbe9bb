use std::time::Duration;

/// Quiet period after the last recorded edit before a batch is submitted.
pub const BATCH_DEBOUNCE: Duration = Duration::from_secs(3 * 60);

/// Path of the notification endpoint, relative to the server origin.
pub const NOTIFICATION_BATCH_PATH: &str = "/api/v1/notifications/batch";

/// Minimum accepted password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Default window during which a client may submit the contact form once.
pub const CONTACT_WINDOW: Duration = Duration::from_secs(60);

/// Default number of clients tracked by the contact rate limiter.
pub const CONTACT_MAX_CLIENTS: usize = 10_000;

/// Upper bound on contact form message length.
pub const CONTACT_MAX_MESSAGE_CHARS: usize = 5_000;
