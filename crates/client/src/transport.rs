//! Batch transport over HTTP.

use async_trait::async_trait;
use log::debug;
use taxdesk_core::batch::BatchTransport;
use taxdesk_core::notifications::BatchNotificationRequest;
use tokio::runtime::Handle;

use crate::client::TaxdeskClient;
use crate::error::{ClientError, Result};

/// Sends coordinator batches to the notification endpoint.
///
/// Beacons run as detached tasks on the runtime that created the transport,
/// so they keep going after the caller has moved on.
#[derive(Debug, Clone)]
pub struct HttpBatchTransport {
    client: TaxdeskClient,
    token: String,
    runtime: Handle,
}

impl HttpBatchTransport {
    /// Must be called from within a Tokio runtime.
    pub fn new(client: TaxdeskClient, token: impl Into<String>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| ClientError::NoRuntime(e.to_string()))?;
        Ok(Self {
            client,
            token: token.into(),
            runtime,
        })
    }
}

#[async_trait]
impl BatchTransport for HttpBatchTransport {
    async fn submit(&self, request: &BatchNotificationRequest) -> taxdesk_core::Result<()> {
        let outcome = self.client.notify_batch(&self.token, request).await?;
        debug!("Batch {:?} acknowledged: {:?}", request.batch_id, outcome);
        Ok(())
    }

    fn beacon(&self, request: BatchNotificationRequest) {
        let client = self.client.clone();
        let token = self.token.clone();
        self.runtime.spawn(async move {
            if let Err(e) = client.notify_batch(&token, &request).await {
                debug!("Beacon for batch {:?} failed: {}", request.batch_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use uuid::Uuid;

    fn request(batch_id: Uuid) -> BatchNotificationRequest {
        BatchNotificationRequest::new(batch_id, vec!["personal".to_string()])
    }

    #[tokio::test]
    async fn test_submit_posts_batch_with_bearer_token() {
        let batch_id = Uuid::new_v4();
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST)
                .path("/api/v1/notifications/batch")
                .header("authorization", "Bearer token-1")
                .json_body(json!({
                    "batchId": batch_id.to_string(),
                    "updatedSections": ["personal"]
                }));
            then.status(200).json_body(json!({ "status": "sent" }));
        });

        let client = TaxdeskClient::new(&server.base_url()).unwrap();
        let transport = HttpBatchTransport::new(client, "token-1").unwrap();
        transport.submit(&request(batch_id)).await.unwrap();

        mock.assert();
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start();
        let _mock = server.mock(|when, then| {
            when.method(Method::POST).path("/api/v1/notifications/batch");
            then.status(502)
                .json_body(json!({ "code": 502, "message": "Failed to send notification" }));
        });

        let client = TaxdeskClient::new(&server.base_url()).unwrap();
        let transport = HttpBatchTransport::new(client, "token-1").unwrap();
        let err = transport.submit(&request(Uuid::new_v4())).await.unwrap_err();

        match err {
            taxdesk_core::Error::Transport(text) => assert!(text.contains("502")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_beacon_is_sent_without_awaiting() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(Method::POST).path("/api/v1/notifications/batch");
            then.status(200).json_body(json!({ "status": "alreadyProcessed" }));
        });

        let client = TaxdeskClient::new(&server.base_url()).unwrap();
        let transport = HttpBatchTransport::new(client, "token-1").unwrap();
        transport.beacon(request(Uuid::new_v4()));

        for _ in 0..100 {
            if mock.hits() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert();
    }

    #[test]
    fn test_transport_requires_runtime() {
        let client = TaxdeskClient::new("http://127.0.0.1:9").unwrap();
        let err = HttpBatchTransport::new(client, "token").unwrap_err();
        assert!(matches!(err, ClientError::NoRuntime(_)));
    }
}
