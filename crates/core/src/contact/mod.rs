//! Contact module - public contact form with per-client throttling.
//!
//! The limiter keeps its state in process memory. Several server instances
//! behind a load balancer each throttle independently.

mod contact_model;
mod contact_service;
mod rate_limiter;


pub use contact_model::ContactRequest;
pub use contact_service::{ContactService, ContactServiceTrait};
pub use rate_limiter::RateLimiter;
