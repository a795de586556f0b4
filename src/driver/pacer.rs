// ABOUTME: Minimum-interval pacer for coroutine step loops.
// ABOUTME: Compensates for work time so steps are spaced at least one interval apart.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Error returned when a pacer wait is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

/// Bounds a loop to a minimum period.
///
/// [`wait`](Self::wait) subtracts the time already spent since the previous
/// baseline instead of sleeping the full interval, so successive returns are
/// spaced at least one interval apart no matter how long the work between
/// them took.
pub struct Pacer {
    baseline: Mutex<Instant>,
}

impl Pacer {
    /// Create a pacer with its baseline set to now.
    pub fn new() -> Self {
        Self {
            baseline: Mutex::new(Instant::now()),
        }
    }

    /// Reset the baseline to now.
    pub async fn reset(&self) {
        *self.baseline.lock().await = Instant::now();
    }

    /// Suspend until at least `min_interval` has elapsed since the baseline.
    ///
    /// Returns immediately (no negative sleep) when the interval has already
    /// passed. The baseline resets to now before `Ok` is returned, even when
    /// no sleep was needed. Returns `Err(Cancelled)` if the cancel future
    /// fires first; cancellation is re-checked after the sleep so a cancel
    /// that raced the timer still lands.
    pub async fn wait<F>(&self, min_interval: Duration, cancel: F) -> Result<(), Cancelled>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let elapsed = self.baseline.lock().await.elapsed();
        if let Some(remaining) = min_interval.checked_sub(elapsed) {
            if !remaining.is_zero() {
                tokio::select! {
                    biased;
                    () = &mut cancel => {
                        return Err(Cancelled);
                    }
                    () = tokio::time::sleep(remaining) => {}
                }
            }
        }

        self.reset().await;

        if futures::poll!(&mut cancel).is_ready() {
            return Err(Cancelled);
        }
        Ok(())
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}
