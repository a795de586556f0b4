// ABOUTME: Cloneable cooperative cancellation signal shared across suspension points.
// ABOUTME: An atomic flag plus a Notify so waiters observe cancellation promptly.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A cooperative cancellation signal.
///
/// Clones share one flag. Suspension points pass [`cancelled`](Self::cancelled)
/// as the cancel future they race against; loops poll
/// [`is_cancelled`](Self::is_cancelled) between steps.
#[derive(Clone, Default)]
pub struct CancelSignal {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    flag: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Idempotent; wakes every current and future waiter.
    pub fn cancel(&self) {
        self.inner.flag.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.flag.load(Ordering::SeqCst)
    }

    /// Resolve once the signal fires; immediately if it already has.
    pub async fn cancelled(&self) {
        loop {
            // Register interest before checking the flag to avoid a missed
            // wakeup between the check and the await.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
