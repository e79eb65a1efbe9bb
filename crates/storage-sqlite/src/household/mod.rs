//! SQLite storage implementation for households and their members.

mod model;
mod repository;

pub use model::{HouseholdDB, HouseholdMemberDB};
pub use repository::HouseholdRepository;
