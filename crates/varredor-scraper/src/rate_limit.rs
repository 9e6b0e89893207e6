//! Request gating for the place-search service.
//!
//! One [`RateLimiter`] is shared by every cell worker of a sweep. It bounds
//! the number of in-flight requests with a semaphore and spaces request
//! starts by a minimum interval, so compliance with the external rate limit
//! does not depend on how many cells run in parallel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::SearchError;

pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_interval: Duration,
    next_slot: Mutex<Instant>,
}

impl RateLimiter {
    /// - `max_in_flight`: maximum concurrent requests (floored at 1)
    /// - `min_interval_ms`: minimum milliseconds between request starts
    #[must_use]
    pub fn new(max_in_flight: usize, min_interval_ms: u64) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_in_flight.max(1))),
            min_interval: Duration::from_millis(min_interval_ms),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// A limiter that never waits. Intended for tests and one-off calls.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(Semaphore::MAX_PERMITS, 0)
    }

    /// Wait for a request slot. The returned guard holds the in-flight permit
    /// until dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::LimiterClosed`] if the semaphore was closed.
    pub async fn acquire(&self) -> Result<RateLimitGuard, SearchError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| SearchError::LimiterClosed)?;

        // Reserve the next start slot, then sleep outside the lock.
        let wait = {
            let mut next = self.next_slot.lock().await;
            let now = Instant::now();
            let start = (*next).max(now);
            *next = start + self.min_interval;
            start - now
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }

        Ok(RateLimitGuard { _permit: permit })
    }
}

/// Releases the in-flight permit when dropped.
pub struct RateLimitGuard {
    _permit: OwnedSemaphorePermit,
}

/// Sleep for `delay` unless `cancel` fires first. Returns `false` when
/// cancelled.
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    if delay.is_zero() {
        return true;
    }
    tokio::select! {
        () = cancel.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}
