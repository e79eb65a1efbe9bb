//! Taxdesk API client.

use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use taxdesk_core::constants::NOTIFICATION_BATCH_PATH;
use taxdesk_core::notifications::{BatchNotificationRequest, BatchOutcome};

use crate::error::{ClientError, Result};
use crate::types::{ApiErrorResponse, Credentials, RegisterResponse, TokenResponse};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the Taxdesk HTTP API.
#[derive(Debug, Clone)]
pub struct TaxdeskClient {
    client: reqwest::Client,
    base_url: String,
}

impl TaxdeskClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The server origin (e.g., "http://127.0.0.1:8080")
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClientError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("API response ({}): {}", status, body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(ClientError::api(status.as_u16(), error.message));
            }
            return Err(ClientError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Register a new account.
    ///
    /// POST /api/v1/auth/register
    pub async fn register(&self, email: &str, password: &str) -> Result<RegisterResponse> {
        let url = format!("{}/api/v1/auth/register", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers(None)?)
            .json(&Credentials { email, password })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Log in and obtain a bearer token.
    ///
    /// POST /api/v1/auth/login
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/v1/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .headers(self.headers(None)?)
            .json(&Credentials { email, password })
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Report a batch of profile edits.
    ///
    /// POST /api/v1/notifications/batch
    pub async fn notify_batch(
        &self,
        token: &str,
        request: &BatchNotificationRequest,
    ) -> Result<BatchOutcome> {
        let url = format!("{}{}", self.base_url, NOTIFICATION_BATCH_PATH);
        debug!("Submitting notification batch {:?}", request.batch_id);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(Some(token))?)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
