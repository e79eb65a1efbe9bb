//! Taxdesk Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic for Taxdesk: the tax profile and
//! household domain, the admin notification endpoint, the contact form, and
//! the client-side batch notification coordinator.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod batch;
pub mod constants;
pub mod contact;
pub mod email;
pub mod errors;
pub mod household;
pub mod notifications;
pub mod profiles;
pub mod users;

#[cfg(test)]
mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
