use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use rand::{rngs::OsRng, RngCore};
use taxdesk_core::constants::{CONTACT_MAX_CLIENTS, CONTACT_WINDOW};
use taxdesk_core::users::normalize_email;
use taxdesk_mailer::DEFAULT_API_URL;

use crate::auth::decode_secret_key;

const DEFAULT_EMAIL_FROM: &str = "Taxdesk <no-reply@taxdesk.local>";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub jwt_secret: Vec<u8>,
    /// True when no secret was configured and a random one was generated.
    pub ephemeral_jwt_secret: bool,
    pub token_ttl: Duration,
    pub admin_emails: Vec<String>,
    pub email_from: String,
    pub email_api_key: Option<String>,
    pub email_api_url: String,
    pub contact_window: Duration,
    pub contact_max_clients: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr: SocketAddr = parse_or(&var, "TD_LISTEN_ADDR", "0.0.0.0:8080".parse()?)?;
        let db_path = var("TD_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = split_list(&var("TD_CORS_ALLOW_ORIGINS").unwrap_or_else(|| "*".into()));
        let timeout_ms: u64 = parse_or(&var, "TD_REQUEST_TIMEOUT_MS", 30_000)?;

        let (jwt_secret, ephemeral_jwt_secret) = match var("TD_JWT_SECRET") {
            Some(raw) => (
                decode_secret_key(&raw).context("Invalid TD_JWT_SECRET")?,
                false,
            ),
            None => {
                let mut bytes = vec![0u8; 32];
                OsRng.fill_bytes(&mut bytes);
                (bytes, true)
            }
        };
        let token_ttl_secs: u64 = parse_or(&var, "TD_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs == 0 {
            return Err(anyhow!("TD_TOKEN_TTL_SECS must be greater than zero"));
        }

        let admin_emails = split_list(&var("TD_ADMIN_EMAILS").unwrap_or_default())
            .iter()
            .map(|email| normalize_email(email))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid TD_ADMIN_EMAILS")?;

        let contact_window_secs: u64 =
            parse_or(&var, "TD_CONTACT_WINDOW_SECS", CONTACT_WINDOW.as_secs())?;
        let contact_max_clients: usize =
            parse_or(&var, "TD_CONTACT_MAX_CLIENTS", CONTACT_MAX_CLIENTS)?;

        let log_format = match var("TD_LOG_FORMAT") {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => return Err(anyhow!("Invalid TD_LOG_FORMAT: {}", other)),
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
            ephemeral_jwt_secret,
            token_ttl: Duration::from_secs(token_ttl_secs),
            admin_emails,
            email_from: var("TD_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.into()),
            email_api_key: var("TD_EMAIL_API_KEY"),
            email_api_url: var("TD_EMAIL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
            contact_window: Duration::from_secs(contact_window_secs),
            contact_max_clients,
            log_format,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("Invalid {}: {} ({})", key, raw, e)),
        None => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
