use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, ValidationError};

/// Body of a batch notification request.
///
/// `batch_id` is optional on the wire so that a missing id can be rejected
/// with a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchNotificationRequest {
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub updated_sections: Vec<String>,
}

impl BatchNotificationRequest {
    pub fn new(batch_id: Uuid, updated_sections: Vec<String>) -> Self {
        Self {
            batch_id: Some(batch_id.to_string()),
            updated_sections,
        }
    }

    /// Returns the batch id in canonical hyphenated form.
    pub fn validated_batch_id(&self) -> Result<String> {
        let raw = self
            .batch_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ValidationError::MissingField("batchId".to_string()))?;

        let parsed = Uuid::parse_str(raw).map_err(|e| {
            ValidationError::InvalidInput(format!("batchId is not a valid UUID: {}", e))
        })?;
        Ok(parsed.hyphenated().to_string())
    }
}

/// Successful outcome of a batch notification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BatchOutcome {
    /// The marker was updated and the email was accepted by the provider.
    Sent,
    /// The batch id matched the stored marker; nothing was sent.
    AlreadyProcessed,
}
