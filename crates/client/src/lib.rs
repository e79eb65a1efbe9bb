//! HTTP client for the Taxdesk API.
//!
//! [`TaxdeskClient`] wraps the auth and notification endpoints;
//! [`HttpBatchTransport`] plugs it into the batch coordinator of
//! `taxdesk_core::batch`.

mod client;
mod error;
mod transport;
mod types;

pub use client::TaxdeskClient;
pub use error::{ClientError, Result};
pub use transport::HttpBatchTransport;
pub use types::{ApiErrorResponse, RegisterResponse, TokenResponse};
