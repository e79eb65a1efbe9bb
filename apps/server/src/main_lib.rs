use std::sync::Arc;

use crate::{auth::AuthManager, config::Config, config::LogFormat};
use taxdesk_core::{
    contact::{ContactService, ContactServiceTrait, RateLimiter},
    email::{AdminRecipients, EmailSender, LogEmailSender},
    household::{HouseholdService, HouseholdServiceTrait},
    notifications::{NotificationService, NotificationServiceTrait},
    profiles::{ProfileService, ProfileServiceTrait},
    users::UserRepositoryTrait,
};
use taxdesk_mailer::ResendEmailSender;
use taxdesk_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, HouseholdRepository, ProfileRepository,
    UserRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub user_repository: Arc<dyn UserRepositoryTrait>,
    pub profile_service: Arc<dyn ProfileServiceTrait>,
    pub household_service: Arc<dyn HouseholdServiceTrait>,
    pub notification_service: Arc<dyn NotificationServiceTrait>,
    pub contact_service: Arc<dyn ContactServiceTrait>,
    pub auth: Arc<AuthManager>,
    pub db_path: String,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

/// Picks the email sender for the configured provider.
pub fn build_email_sender(config: &Config) -> anyhow::Result<Arc<dyn EmailSender>> {
    match config.email_api_key.as_deref() {
        Some(key) => {
            let sender = ResendEmailSender::new(&config.email_api_url, key)?;
            tracing::info!("Email delivery via {}", config.email_api_url);
            Ok(Arc::new(sender))
        }
        None => {
            tracing::warn!("TD_EMAIL_API_KEY is not set; emails will only be logged");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let email_sender = build_email_sender(config)?;
    build_state_with_mailer(config, email_sender).await
}

pub async fn build_state_with_mailer(
    config: &Config,
    email_sender: Arc<dyn EmailSender>,
) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer(pool.clone())?;

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let profile_repository = Arc::new(ProfileRepository::new(pool.clone(), writer.clone()));
    let household_repository = Arc::new(HouseholdRepository::new(pool.clone(), writer.clone()));

    let recipients = AdminRecipients::new(config.email_from.clone(), config.admin_emails.clone());
    if recipients.is_empty() {
        tracing::warn!("TD_ADMIN_EMAILS is empty; notifications and contact messages will fail");
    }

    let profile_service: Arc<dyn ProfileServiceTrait> =
        Arc::new(ProfileService::new(profile_repository.clone()));
    let household_service: Arc<dyn HouseholdServiceTrait> =
        Arc::new(HouseholdService::new(household_repository.clone()));
    let notification_service: Arc<dyn NotificationServiceTrait> =
        Arc::new(NotificationService::new(
            profile_repository,
            household_repository,
            email_sender.clone(),
            recipients.clone(),
        ));

    let limiter = Arc::new(RateLimiter::new(
        config.contact_window,
        config.contact_max_clients,
    ));
    let contact_service: Arc<dyn ContactServiceTrait> =
        Arc::new(ContactService::new(email_sender, recipients, limiter));

    let auth = Arc::new(AuthManager::new(&config.jwt_secret, config.token_ttl));

    Ok(Arc::new(AppState {
        user_repository,
        profile_service,
        household_service,
        notification_service,
        contact_service,
        auth,
        db_path,
    }))
}
