//! Repository and service traits for tax profiles.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Result;
use crate::profiles::profiles_model::{BatchClaim, ProfileContactUpdate, ProfileSection, TaxProfile};

/// Repository trait for the profile store.
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    fn get_profile(&self, user_id: &str) -> Result<TaxProfile>;

    async fn update_contact(&self, user_id: &str, update: ProfileContactUpdate)
        -> Result<TaxProfile>;

    /// Replaces `tax_data[section]` with `document` and bumps `updated_at`.
    async fn save_section(
        &self,
        user_id: &str,
        section: ProfileSection,
        document: Value,
    ) -> Result<TaxProfile>;

    /// Reads, compares and writes `last_notified_batch_id` as one unit.
    async fn claim_notification_batch(&self, user_id: &str, batch_id: &str) -> Result<BatchClaim>;

    /// Restores `previous` if the marker still holds `batch_id`.
    ///
    /// Returns true when the marker was rolled back.
    async fn release_notification_batch(
        &self,
        user_id: &str,
        batch_id: &str,
        previous: Option<String>,
    ) -> Result<bool>;
}

/// Trait for profile service operations
#[async_trait]
pub trait ProfileServiceTrait: Send + Sync {
    fn get_profile(&self, user_id: &str) -> Result<TaxProfile>;

    async fn update_contact(&self, user_id: &str, update: ProfileContactUpdate)
        -> Result<TaxProfile>;

    async fn save_section(&self, user_id: &str, section: &str, document: Value)
        -> Result<TaxProfile>;
}
