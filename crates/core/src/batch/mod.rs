//! Batch module - client-side coordinator for admin notifications.
//!
//! Section saves are reported with [`BatchCoordinator::record_edit`]. Edits
//! accumulate into one pending batch which is submitted to the notification
//! endpoint once no edit has arrived for the debounce window, or immediately
//! on request. The endpoint deduplicates by batch id, so a batch may safely be
//! delivered both by the timer and by the hide-time beacon.

mod coordinator;
mod transport;


pub use coordinator::{BatchConfig, BatchCoordinator, PendingBatchView, SubmitOutcome};
pub use transport::{BatchTransport, NoOpBatchTransport};
