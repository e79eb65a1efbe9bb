//! Profiles module - the per-user tax profile and its idempotency marker.

mod profiles_model;
mod profiles_service;
mod profiles_traits;

#[cfg(test)]
mod profiles_service_tests;

pub use profiles_model::{BatchClaim, ProfileContactUpdate, ProfileSection, TaxProfile};
pub use profiles_service::ProfileService;
pub use profiles_traits::{ProfileRepositoryTrait, ProfileServiceTrait};
