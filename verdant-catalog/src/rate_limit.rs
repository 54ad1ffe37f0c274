//! Sliding-window admission control for outbound catalog requests

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Slack added to each computed admission sleep so a woken task finds the
/// oldest timestamp already outside the window.
const ADMISSION_EPSILON: Duration = Duration::from_millis(10);

/// Admits at most `max_requests` operations per rolling `time_window`,
/// suspending callers instead of rejecting them.
///
/// The read-prune-decide-record step is one critical section under a single
/// mutex; the suspension itself happens outside the lock, so a waiting caller
/// never blocks another caller's accounting. Ordering among waiters is
/// FIFO-by-arrival at the lock only; a waiter is delayed at most one
/// `time_window` per pass.
pub struct RateLimiter {
    max_requests: usize,
    time_window: Duration,
    admitted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        RateLimiter {
            max_requests: max_requests.max(1),
            time_window,
            admitted: Mutex::new(VecDeque::new()),
        }
    }

    /// Suspend until the caller may issue one request, then record it.
    ///
    /// Never errors: a poisoned mutex is recovered, since the guarded queue
    /// of timestamps is valid in any state a panicking holder left it in.
    pub async fn wait_if_needed(&self) {
        loop {
            let sleep_for = {
                let mut admitted = self
                    .admitted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                while let Some(oldest) = admitted.front() {
                    if now.duration_since(*oldest) >= self.time_window {
                        admitted.pop_front();
                    } else {
                        break;
                    }
                }
                if admitted.len() < self.max_requests {
                    admitted.push_back(now);
                    return;
                }
                match admitted.front().copied() {
                    Some(oldest) => {
                        self.time_window.saturating_sub(now.duration_since(oldest))
                            + ADMISSION_EPSILON
                    }
                    // max_requests >= 1, so a full window is never empty.
                    None => {
                        admitted.push_back(now);
                        return;
                    }
                }
            };
            debug!(wait_ms = sleep_for.as_millis() as u64, "Admission window full, delaying request");
            tokio::time::sleep(sleep_for).await;
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_requests", &self.max_requests)
            .field("time_window", &self.time_window)
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
