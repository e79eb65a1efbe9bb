use async_trait::async_trait;

use crate::errors::Result;
use crate::household::household_model::{
    HouseholdMember, HouseholdMemberUpdate, HouseholdWithMembers, NewHouseholdMember,
};

/// Trait for household repository operations.
///
/// Every member operation is scoped to the household of `user_id`; a member
/// that belongs to another household is reported as not found.
#[async_trait]
pub trait HouseholdRepositoryTrait: Send + Sync {
    /// Loads the user's household and members, creating an empty household
    /// when none exists yet.
    async fn get_or_create(&self, user_id: &str) -> Result<HouseholdWithMembers>;

    async fn insert_member(
        &self,
        user_id: &str,
        new_member: NewHouseholdMember,
    ) -> Result<HouseholdMember>;

    async fn update_member(
        &self,
        user_id: &str,
        member_id: &str,
        update: HouseholdMemberUpdate,
    ) -> Result<HouseholdMember>;

    async fn delete_member(&self, user_id: &str, member_id: &str) -> Result<usize>;
}

/// Trait for household service operations
#[async_trait]
pub trait HouseholdServiceTrait: Send + Sync {
    async fn get_household(&self, user_id: &str) -> Result<HouseholdWithMembers>;

    async fn add_member(
        &self,
        user_id: &str,
        new_member: NewHouseholdMember,
    ) -> Result<HouseholdMember>;

    async fn update_member(
        &self,
        user_id: &str,
        member_id: &str,
        update: HouseholdMemberUpdate,
    ) -> Result<HouseholdMember>;

    async fn remove_member(&self, user_id: &str, member_id: &str) -> Result<()>;
}
