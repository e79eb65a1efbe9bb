//! Transport used by the coordinator to reach the notification endpoint.

use async_trait::async_trait;

use crate::errors::Result;
use crate::notifications::BatchNotificationRequest;

/// Delivers batch notification requests to the notification endpoint.
///
/// # Design Rules
///
/// - `submit()` resolves once the endpoint acknowledged (or rejected) the batch
/// - `beacon()` must not block and must not report a result; it is called
///   while the client is being hidden or torn down
/// - Both paths send the same payload to the same endpoint
#[async_trait]
pub trait BatchTransport: Send + Sync + 'static {
    async fn submit(&self, request: &BatchNotificationRequest) -> Result<()>;

    fn beacon(&self, request: BatchNotificationRequest);
}

/// Transport that drops every request. Useful when notifications are disabled.
#[derive(Clone, Default)]
pub struct NoOpBatchTransport;

#[async_trait]
impl BatchTransport for NoOpBatchTransport {
    async fn submit(&self, request: &BatchNotificationRequest) -> Result<()> {
        log::debug!("Dropping batch {:?}", request.batch_id);
        Ok(())
    }

    fn beacon(&self, _request: BatchNotificationRequest) {}
}
