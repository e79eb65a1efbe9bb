use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{HouseholdRepositoryTrait, HouseholdServiceTrait};
use crate::errors::{Error, Result};
use crate::household::{
    HouseholdMember, HouseholdMemberUpdate, HouseholdWithMembers, NewHouseholdMember,
};

pub struct HouseholdService {
    household_repository: Arc<dyn HouseholdRepositoryTrait>,
}

impl HouseholdService {
    pub fn new(household_repository: Arc<dyn HouseholdRepositoryTrait>) -> Self {
        HouseholdService {
            household_repository,
        }
    }
}

#[async_trait]
impl HouseholdServiceTrait for HouseholdService {
    async fn get_household(&self, user_id: &str) -> Result<HouseholdWithMembers> {
        self.household_repository.get_or_create(user_id).await
    }

    async fn add_member(
        &self,
        user_id: &str,
        new_member: NewHouseholdMember,
    ) -> Result<HouseholdMember> {
        new_member.validate()?;
        let member = self
            .household_repository
            .insert_member(user_id, new_member)
            .await?;
        debug!("Added household member {} for user {}", member.id, user_id);
        Ok(member)
    }

    async fn update_member(
        &self,
        user_id: &str,
        member_id: &str,
        update: HouseholdMemberUpdate,
    ) -> Result<HouseholdMember> {
        update.validate()?;
        self.household_repository
            .update_member(user_id, member_id, update)
            .await
    }

    async fn remove_member(&self, user_id: &str, member_id: &str) -> Result<()> {
        let deleted = self
            .household_repository
            .delete_member(user_id, member_id)
            .await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Household member {}", member_id)));
        }
        Ok(())
    }
}
