use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::{ProfileRepositoryTrait, ProfileServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::profiles::{ProfileContactUpdate, ProfileSection, TaxProfile};

pub struct ProfileService {
    profile_repository: Arc<dyn ProfileRepositoryTrait>,
}

impl ProfileService {
    pub fn new(profile_repository: Arc<dyn ProfileRepositoryTrait>) -> Self {
        ProfileService { profile_repository }
    }
}

#[async_trait]
impl ProfileServiceTrait for ProfileService {
    fn get_profile(&self, user_id: &str) -> Result<TaxProfile> {
        self.profile_repository.get_profile(user_id)
    }

    async fn update_contact(
        &self,
        user_id: &str,
        update: ProfileContactUpdate,
    ) -> Result<TaxProfile> {
        let update = update.normalized()?;
        self.profile_repository.update_contact(user_id, update).await
    }

    async fn save_section(
        &self,
        user_id: &str,
        section: &str,
        document: Value,
    ) -> Result<TaxProfile> {
        let section: ProfileSection = section.parse()?;
        if !document.is_object() {
            return Err(ValidationError::InvalidInput(format!(
                "Section '{}' must be a JSON object",
                section
            ))
            .into());
        }

        debug!("Saving profile section {} for user {}", section, user_id);
        self.profile_repository
            .save_section(user_id, section, document)
            .await
    }
}
