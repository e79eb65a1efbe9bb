//! Background housekeeping for the contact form throttle.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Eviction never runs more often than this, whatever the window.
const MIN_EVICTION_INTERVAL_SECS: u64 = 10;

/// Starts periodic eviction of expired rate limiter entries.
pub fn start_rate_limit_eviction(state: Arc<AppState>, window: Duration) -> JoinHandle<()> {
    let period = window.max(Duration::from_secs(MIN_EVICTION_INTERVAL_SECS));
    tokio::spawn(async move {
        info!("Contact throttle eviction started ({}s interval)", period.as_secs());
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let evicted = state.contact_service.evict_expired();
            if evicted > 0 {
                debug!("Evicted {} expired contact throttle entries", evicted);
            }
        }
    })
}
