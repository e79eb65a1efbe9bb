//! SQLite storage implementation for Taxdesk.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `taxdesk-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for users, profiles and households
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` is database-agnostic and works with traits.
//!
//! ```text
//!          core (domain)
//!                │
//!                ▼
//!      storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```
//!
//! Every write goes through the single writer actor ([`WriteHandle`]), so
//! read-compare-write sequences such as claiming a notification batch are
//! serialized per database.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod household;
pub mod profiles;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use household::HouseholdRepository;
pub use profiles::ProfileRepository;
pub use users::UserRepository;

// Re-export from taxdesk-core for convenience
pub use taxdesk_core::errors::{DatabaseError, Error, Result};
