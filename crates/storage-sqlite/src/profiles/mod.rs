//! SQLite storage implementation for tax profiles.

mod model;
mod repository;

pub use model::{NewProfileDB, ProfileDB};
pub use repository::ProfileRepository;
