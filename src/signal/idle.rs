// ABOUTME: Injectable "should I yield now" capability plus the Yielder built on it.
// ABOUTME: Abstracts the platform input-queue probe behind the IdleSignal trait.

use std::future::Future;
use std::sync::Arc;

use super::completion::CompletionSource;
use crate::error::SignalError;

/// Callback an [`IdleSignal`] implementation invokes on each idle transition.
pub type IdleCallback = Arc<dyn Fn() + Send + Sync>;

/// Identifies a single idle subscription, for paired unsubscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// The external event loop's view of pending work.
///
/// Implemented by platform glue (an input-queue probe, a UI idle event). The
/// core only needs the predicate and a subscribe/unsubscribe pair; it holds a
/// subscription exactly for the span of one suspension.
pub trait IdleSignal: Send + Sync {
    /// True when there is pending external work the event loop should
    /// process before the coroutine takes another step.
    fn work_pending(&self) -> bool;

    /// Register a callback fired on each idle transition.
    fn subscribe(&self, callback: IdleCallback) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// Pairs subscribe with unsubscribe on every exit path.
struct Subscription<'a, S: IdleSignal + ?Sized> {
    signal: &'a S,
    id: SubscriptionId,
}

impl<'a, S: IdleSignal + ?Sized> Subscription<'a, S> {
    fn new(signal: &'a S, callback: IdleCallback) -> Self {
        let id = signal.subscribe(callback);
        Self { signal, id }
    }
}

impl<S: IdleSignal + ?Sized> Drop for Subscription<'_, S> {
    fn drop(&mut self) {
        self.signal.unsubscribe(self.id);
    }
}

/// A reusable yield point that defers to the external event loop.
///
/// [`yield_now`](Self::yield_now) returns immediately when nothing is
/// pending; otherwise it subscribes to the idle signal and suspends until a
/// transition observes the work queue drained.
pub struct Yielder<S: IdleSignal> {
    signal: Arc<S>,
    source: Arc<CompletionSource>,
}

impl<S: IdleSignal + 'static> Yielder<S> {
    pub fn new(signal: Arc<S>) -> Self {
        Self {
            signal,
            source: Arc::new(CompletionSource::new()),
        }
    }

    /// Suspend until the external loop reports no pending work.
    pub async fn yield_now<F>(&self, cancel: F) -> Result<(), SignalError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        if !self.signal.work_pending() {
            // Fast path; still honor a cancel that has already fired.
            if futures::poll!(&mut cancel).is_ready() {
                return Err(SignalError::Cancelled);
            }
            return Ok(());
        }

        // Arm before subscribing so a completion from the callback cannot be
        // lost.
        let wait = self.source.wait();
        let _subscription = Subscription::new(self.signal.as_ref(), {
            let signal = Arc::clone(&self.signal);
            let source = Arc::clone(&self.source);
            Arc::new(move || {
                if !signal.work_pending() {
                    source.complete();
                }
            })
        });

        // The queue may have drained between the probe and the subscription.
        if !self.signal.work_pending() {
            self.source.complete();
        }

        tokio::select! {
            biased;
            () = &mut cancel => Err(SignalError::Cancelled),
            result = wait => result,
        }
    }
}
