// ABOUTME: Timer-backed completion signal - ticks a CompletionSource at a fixed period.
// ABOUTME: The ticker task is released on close() and on drop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::completion::{CompletionSource, Wait};
use crate::error::SignalError;

/// Completes a [`CompletionSource`] once per period.
///
/// Ticks that arrive while no wait is outstanding are dropped; the next
/// [`next_tick`](Self::next_tick) waits for a fresh tick. Must be created on
/// a tokio runtime.
pub struct TickSource {
    source: Arc<CompletionSource>,
    ticker: JoinHandle<()>,
}

impl TickSource {
    pub fn new(period: Duration) -> Self {
        let source = Arc::new(CompletionSource::new());
        let ticker = tokio::spawn({
            let source = Arc::clone(&source);
            async move {
                let start = tokio::time::Instant::now() + period;
                let mut timer = tokio::time::interval_at(start, period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    timer.tick().await;
                    source.complete();
                }
            }
        });
        Self { source, ticker }
    }

    /// Wait for the next timer tick.
    pub fn next_tick(&self) -> Wait {
        self.source.wait()
    }

    /// Wait for the next tick, racing against a cancellation future.
    pub async fn next_tick_with_cancel<F>(&self, cancel: F) -> Result<(), SignalError>
    where
        F: Future<Output = ()>,
    {
        self.source.wait_with_cancel(cancel).await
    }

    /// Stop the ticker and tear down the source; pending waits resolve as
    /// cancelled.
    pub fn close(&self) {
        self.ticker.abort();
        self.source.close();
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.close();
    }
}
