//! Household module - household members linked 1:1 to a primary user.

mod household_model;
mod household_service;
mod household_traits;


pub use household_model::{
    Household, HouseholdMember, HouseholdMemberUpdate, HouseholdWithMembers, NewHouseholdMember,
    Relationship,
};
pub use household_service::HouseholdService;
pub use household_traits::{HouseholdRepositoryTrait, HouseholdServiceTrait};
