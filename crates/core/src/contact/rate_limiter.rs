//! Bounded, time-windowed rate limiter keyed by client.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use crate::errors::{Error, Result};

/// Accepts each client key at most once per window.
///
/// Entries older than the window are dropped by [`RateLimiter::evict_expired`].
/// When `capacity` keys are tracked, expired entries are evicted first and the
/// oldest entry after that.
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    capacity: usize,
    entries: DashMap<String, Instant>,
}

impl RateLimiter {
    pub fn new(window: Duration, capacity: usize) -> Self {
        Self {
            window,
            capacity: capacity.max(1),
            entries: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records an attempt for `key`, or returns `Error::RateLimited` when the
    /// key was accepted less than one window ago.
    pub fn check(&self, key: &str) -> Result<()> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.capacity {
            self.make_room();
        }

        let now = Instant::now();
        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(now);
                Ok(())
            }
            Entry::Occupied(mut occupied) => {
                let elapsed = now.saturating_duration_since(*occupied.get());
                if elapsed < self.window {
                    let remaining = self.window - elapsed;
                    return Err(Error::RateLimited {
                        retry_after_secs: retry_after_secs(remaining),
                    });
                }
                occupied.insert(now);
                Ok(())
            }
        }
    }

    /// Drops the entry for `key` so the next attempt is accepted.
    pub fn forget(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Removes entries whose window has passed. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        let window = self.window;
        self.entries.retain(|_, last| last.elapsed() < window);
        before.saturating_sub(self.entries.len())
    }

    fn make_room(&self) {
        if self.evict_expired() > 0 && self.entries.len() < self.capacity {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| *entry.value())
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            log::debug!("Rate limiter full; evicting {}", key);
            self.entries.remove(&key);
        }
    }
}

/// Whole seconds to wait, rounded up so a retry at that point is accepted.
fn retry_after_secs(remaining: Duration) -> u64 {
    (remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn test_same_key_is_throttled_within_window() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("1.2.3.4").unwrap();
        tokio::time::advance(Duration::from_secs(20)).await;
        let err = limiter.check("1.2.3.4").unwrap_err();

        assert!(matches!(
            err,
            Error::RateLimited {
                retry_after_secs: 40
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_rounds_up_partial_seconds() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("1.2.3.4").unwrap();
        tokio::time::advance(Duration::from_millis(100)).await;
        let err = limiter.check("1.2.3.4").unwrap_err();
        let Error::RateLimited { retry_after_secs } = err else {
            panic!("expected RateLimited, got {err:?}");
        };
        assert_eq!(retry_after_secs, 60);

        tokio::time::advance(Duration::from_secs(retry_after_secs)).await;
        limiter.check("1.2.3.4").unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_is_accepted_again_after_window() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("1.2.3.4").unwrap();
        tokio::time::advance(WINDOW).await;

        limiter.check("1.2.3.4").unwrap();
        assert!(limiter.check("1.2.3.4").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_are_independent() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("a").unwrap();
        limiter.check("b").unwrap();

        assert!(limiter.check("a").is_err());
        assert_eq!(limiter.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_expired_removes_only_stale_entries() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("old").unwrap();
        tokio::time::advance(Duration::from_secs(45)).await;
        limiter.check("new").unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(limiter.evict_expired(), 1);
        assert_eq!(limiter.len(), 1);
        assert!(limiter.check("new").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_limiter_drops_oldest_entry() {
        let limiter = RateLimiter::new(WINDOW, 2);

        limiter.check("first").unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        limiter.check("second").unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        limiter.check("third").unwrap();

        assert_eq!(limiter.len(), 2);
        limiter.check("first").unwrap();
        assert!(limiter.check("third").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forget_allows_immediate_retry() {
        let limiter = RateLimiter::new(WINDOW, 10);

        limiter.check("a").unwrap();
        limiter.forget("a");

        limiter.check("a").unwrap();
    }
}
