//! Debounced batch notification coordinator.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::transport::BatchTransport;
use crate::constants::BATCH_DEBOUNCE;
use crate::notifications::BatchNotificationRequest;

/// Coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Quiet period after the last edit before the batch is submitted.
    pub debounce: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            debounce: BATCH_DEBOUNCE,
        }
    }
}

/// Result of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The endpoint acknowledged the batch.
    Delivered,
    /// The endpoint call failed. The batch is dropped, not retried.
    Failed,
    /// Stale batch id, nothing pending, or another submission in flight.
    Skipped,
}

/// Snapshot of the pending batch for a "changes pending" indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingBatchView {
    pub batch_id: Uuid,
    pub updated_sections: Vec<String>,
    /// True while an earlier batch is still being submitted.
    pub is_submitting: bool,
}

#[derive(Debug)]
struct PendingBatch {
    id: Uuid,
    sections: BTreeSet<String>,
}

impl PendingBatch {
    fn to_request(&self) -> BatchNotificationRequest {
        BatchNotificationRequest::new(self.id, self.sections.iter().cloned().collect())
    }
}

#[derive(Default)]
struct CoordinatorState {
    /// Accumulating batch. Never holds an empty section set.
    pending: Option<PendingBatch>,
    /// Batch whose submission has started but not resolved. Doubles as the
    /// `is_submitting` flag.
    in_flight: Option<BatchNotificationRequest>,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is replaced or cancelled, so a timer that
    /// already woke up can tell it is stale.
    timer_generation: u64,
    /// Set by `teardown`; no timer is armed afterwards.
    torn_down: bool,
}

impl CoordinatorState {
    fn cancel_timer(&mut self) {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}

struct Shared<T> {
    transport: T,
    config: BatchConfig,
    state: Mutex<CoordinatorState>,
}

impl<T: BatchTransport> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the debounce timer with a fresh one.
    fn arm_timer(self: &Arc<Self>, state: &mut CoordinatorState) {
        state.cancel_timer();
        if state.torn_down {
            debug!("Coordinator torn down; not arming debounce timer");
            return;
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("No Tokio runtime available; batch will only be sent on request");
                return;
            }
        };

        let generation = state.timer_generation;
        // Measured from the edit, not from when the task first runs.
        let deadline = tokio::time::Instant::now() + self.config.debounce;
        let weak: Weak<Self> = Arc::downgrade(self);
        state.timer = Some(runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let batch_id = {
                let mut state = shared.lock();
                if state.timer_generation != generation {
                    return;
                }
                // Detach so that submitting does not abort this very task.
                state.timer = None;
                match &state.pending {
                    Some(batch) => batch.id,
                    None => return,
                }
            };
            debug!("Debounce window elapsed for batch {}", batch_id);
            shared.submit(batch_id).await;
        }));
    }

    async fn submit(self: &Arc<Self>, batch_id: Uuid) -> SubmitOutcome {
        let request = {
            let mut state = self.lock();
            if state.in_flight.is_some() {
                debug!("Submission already in flight; skipping batch {}", batch_id);
                return SubmitOutcome::Skipped;
            }
            let is_current = state
                .pending
                .as_ref()
                .is_some_and(|batch| batch.id == batch_id);
            if !is_current {
                debug!("Batch {} is no longer pending; skipping", batch_id);
                return SubmitOutcome::Skipped;
            }
            state.cancel_timer();
            let Some(batch) = state.pending.take() else {
                return SubmitOutcome::Skipped;
            };
            let request = batch.to_request();
            state.in_flight = Some(request.clone());
            request
        };

        let _guard = InFlightGuard { shared: self };

        match self.transport.submit(&request).await {
            Ok(()) => {
                debug!(
                    "Batch {} delivered with sections {:?}",
                    batch_id, request.updated_sections
                );
                SubmitOutcome::Delivered
            }
            Err(e) => {
                warn!("Failed to submit notification batch {}: {}", batch_id, e);
                SubmitOutcome::Failed
            }
        }
    }
}

/// Clears the in-flight slot when a submission resolves or is cancelled.
struct InFlightGuard<'a, T: BatchTransport> {
    shared: &'a Arc<Shared<T>>,
}

impl<T: BatchTransport> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.in_flight = None;
        // A timer that fired during the flight was skipped; give the batch
        // collected meanwhile a new window instead of stranding it.
        if state.pending.is_some() && state.timer.is_none() {
            self.shared.arm_timer(&mut state);
        }
    }
}

/// Accumulates section edits and submits them as one debounced batch.
///
/// Any edit recorded after a submission has started opens a new batch with a
/// new id; the submitted batch is never extended. At most one submission is in
/// flight at a time and at most one debounce timer exists.
pub struct BatchCoordinator<T: BatchTransport> {
    shared: Arc<Shared<T>>,
}

impl<T: BatchTransport> BatchCoordinator<T> {
    pub fn new(transport: T, config: BatchConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    pub fn config(&self) -> BatchConfig {
        self.shared.config
    }

    /// Records a saved edit and restarts the debounce timer.
    ///
    /// Opens a new batch when none is pending. An edit without a section name
    /// only extends a pending batch; on a clean state it is ignored, since a
    /// batch without sections would have nothing to report.
    pub fn record_edit(&self, section: Option<&str>) {
        let mut state = self.shared.lock();

        match (state.pending.as_mut(), section) {
            (Some(batch), Some(name)) => {
                batch.sections.insert(name.to_string());
            }
            (Some(_), None) => {}
            (None, Some(name)) => {
                let batch = PendingBatch {
                    id: Uuid::new_v4(),
                    sections: BTreeSet::from([name.to_string()]),
                };
                debug!("Opened notification batch {}", batch.id);
                state.pending = Some(batch);
            }
            (None, None) => {
                debug!("Ignoring section-less edit with no pending batch");
                return;
            }
        }

        self.shared.arm_timer(&mut state);
    }

    /// Submits the batch identified by `batch_id` if it is still pending and
    /// no other submission is in flight.
    pub async fn submit_batch(&self, batch_id: Uuid) -> SubmitOutcome {
        self.shared.submit(batch_id).await
    }

    /// Submits whatever is pending right now, bypassing the timer.
    pub async fn submit_now(&self) -> SubmitOutcome {
        let batch_id = self.shared.lock().pending.as_ref().map(|batch| batch.id);
        match batch_id {
            Some(id) => self.submit_batch(id).await,
            None => SubmitOutcome::Skipped,
        }
    }

    /// Beacons the pending batch and any unresolved in-flight batch.
    ///
    /// Leaves the coordinator state untouched: the client may be gone before
    /// anything could be observed.
    pub fn flush_on_hide(&self) {
        let requests: Vec<BatchNotificationRequest> = {
            let state = self.shared.lock();
            state
                .in_flight
                .iter()
                .cloned()
                .chain(state.pending.as_ref().map(PendingBatch::to_request))
                .collect()
        };

        for request in requests {
            debug!("Beaconing batch {:?} on hide", request.batch_id);
            self.shared.transport.beacon(request);
        }
    }

    pub fn pending(&self) -> Option<PendingBatchView> {
        let state = self.shared.lock();
        state.pending.as_ref().map(|batch| PendingBatchView {
            batch_id: batch.id,
            updated_sections: batch.sections.iter().cloned().collect(),
            is_submitting: state.in_flight.is_some(),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.shared.lock().in_flight.is_some()
    }

    /// Cancels the debounce timer for good. Nothing is sent automatically
    /// afterwards, not even when an in-flight submission resolves; pending
    /// edits stay available to `submit_now` and `flush_on_hide`.
    pub fn teardown(&self) {
        let mut state = self.shared.lock();
        state.torn_down = true;
        state.cancel_timer();
    }
}

impl<T: BatchTransport> Drop for BatchCoordinator<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
