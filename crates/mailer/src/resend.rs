//! HTTP client for the transactional email API.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use taxdesk_core::email::{EmailMessage, EmailSender};

use crate::error::{MailerError, Result};

/// Default base URL of the email API.
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    name: Option<String>,
    message: String,
}

/// Email sender backed by a Resend-compatible HTTP API.
#[derive(Debug, Clone)]
pub struct ResendEmailSender {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl ResendEmailSender {
    /// Create a new sender.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the email API (e.g., "https://api.resend.com")
    /// * `api_key` - The provider API key, sent as a bearer token
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| MailerError::InvalidConfig("Invalid email API key format".to_string()))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Sends one message and returns the provider's message id.
    ///
    /// POST /emails
    pub async fn send_message(&self, message: &EmailMessage) -> Result<String> {
        if message.to.is_empty() {
            return Err(MailerError::InvalidConfig(
                "Email has no recipients".to_string(),
            ));
        }

        let url = format!("{}/emails", self.base_url);
        let body = SendEmailRequest {
            from: &message.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
            html: message.html.as_deref(),
            reply_to: message.reply_to.as_deref(),
        };
        debug!("Sending email '{}' to {:?}", message.subject, message.to);

        let response = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(error) => match error.name {
                    Some(name) => format!("{}: {}", name, error.message),
                    None => error.message,
                },
                Err(_) => format!("Request failed: {}", text),
            };
            return Err(MailerError::api(status.as_u16(), message));
        }

        let parsed: SendEmailResponse = serde_json::from_str(&text)?;
        info!("Email '{}' accepted as {}", message.subject, parsed.id);
        Ok(parsed.id)
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: EmailMessage) -> taxdesk_core::Result<()> {
        self.send_message(&message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn message() -> EmailMessage {
        EmailMessage {
            from: "Taxdesk <no-reply@taxdesk.test>".to_string(),
            to: vec!["staff@firm.test".to_string()],
            reply_to: Some("ada@example.com".to_string()),
            subject: "Profile updated: Ada".to_string(),
            text: "Body".to_string(),
            html: None,
        }
    }

    #[tokio::test]
    async fn test_send_posts_message_with_bearer_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/emails")
                .header("authorization", "Bearer re_test")
                .json_body(json!({
                    "from": "Taxdesk <no-reply@taxdesk.test>",
                    "to": ["staff@firm.test"],
                    "subject": "Profile updated: Ada",
                    "text": "Body",
                    "reply_to": "ada@example.com"
                }));
            then.status(200).json_body(json!({ "id": "email-123" }));
        });

        let sender = ResendEmailSender::new(&server.base_url(), "re_test").unwrap();
        let id = sender.send_message(&message()).await.unwrap();

        assert_eq!(id, "email-123");
        mock.assert();
    }

    #[tokio::test]
    async fn test_provider_error_becomes_core_email_error() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(Method::POST).path("/emails");
            then.status(422).json_body(json!({
                "statusCode": 422,
                "name": "validation_error",
                "message": "Invalid `from` field"
            }));
        });

        let sender = ResendEmailSender::new(&server.base_url(), "re_test").unwrap();
        let err = sender.send(message()).await.unwrap_err();

        match err {
            taxdesk_core::Error::Email(text) => {
                assert!(text.contains("422"));
                assert!(text.contains("validation_error: Invalid `from` field"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_message_without_recipients_is_rejected_locally() {
        let sender = ResendEmailSender::new("http://127.0.0.1:9", "re_test").unwrap();
        let mut empty = message();
        empty.to.clear();

        let err = sender.send_message(&empty).await.unwrap_err();
        assert!(matches!(err, MailerError::InvalidConfig(_)));
    }
}
