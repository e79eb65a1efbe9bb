//! Users module - registered accounts that own a tax profile and a household.

mod users_model;
mod users_traits;


pub use users_model::{normalize_email, NewUser, RegisterUser, User};
pub use users_traits::UserRepositoryTrait;
