use async_trait::async_trait;

use crate::errors::Result;
use crate::users::users_model::{NewUser, User};

/// Trait for user repository operations
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// Looks up a user by normalized email. Returns None if no user matches.
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Creates the user together with an empty tax profile and household.
    ///
    /// A duplicate email is reported as `Error::ConstraintViolation`.
    async fn create_with_profile(&self, new_user: NewUser) -> Result<User>;
}
