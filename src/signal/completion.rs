// ABOUTME: Manually-resumable single-shot awaitable guarded by generation tokens.
// ABOUTME: The foundation every higher-level suspension point in weave is built on.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::error::SignalError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Pending,
    Completed,
}

#[derive(Debug)]
struct Shared {
    state: State,
    generation: u16,
    waker: Option<Waker>,
    closed: bool,
}

impl Shared {
    /// Step by two and mask to keep the token positive and non-zero.
    fn advance_generation(&mut self) {
        self.generation = self.generation.wrapping_add(2) & (i16::MAX as u16);
    }
}

/// A manually-resumable single-shot wait primitive.
///
/// One logical yield-point owns a `CompletionSource` and reuses it across many
/// suspend/resume cycles. Each cycle runs Idle -> Pending (a [`wait`] is
/// outstanding) -> Completed ([`complete`] fired) -> back to Idle once the
/// waiter consumes the result. A generation token advances on every consumed
/// completion so a stale handle can never resume a later wait.
///
/// At most one waiter may be outstanding at a time; a second concurrent
/// [`wait`] resolves to [`SignalError::MultipleContinuation`].
///
/// [`wait`]: Self::wait
/// [`complete`]: Self::complete
pub struct CompletionSource {
    shared: Arc<Mutex<Shared>>,
}

impl CompletionSource {
    /// Create a new source in the Idle state.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state: State::Idle,
                generation: 1,
                waker: None,
                closed: false,
            })),
        }
    }

    /// Arm the source and return a future that resolves when [`complete`]
    /// fires.
    ///
    /// Dropping the returned [`Wait`] before it resolves disarms the source
    /// and advances the generation, so a late `complete()` becomes a no-op
    /// instead of resuming the wrong waiter.
    ///
    /// [`complete`]: Self::complete
    pub fn wait(&self) -> Wait {
        let mut shared = self.shared.lock().unwrap();
        let fault = if shared.closed {
            Some(SignalError::Cancelled)
        } else if shared.state != State::Idle {
            Some(SignalError::MultipleContinuation)
        } else {
            shared.state = State::Pending;
            None
        };
        Wait {
            shared: Arc::clone(&self.shared),
            token: shared.generation,
            fault,
            finished: false,
        }
    }

    /// Wait, racing against a cancellation future.
    ///
    /// Cancellation wins ties and resolves promptly as
    /// `Err(SignalError::Cancelled)`; the abandoned wait disarms the source on
    /// drop, leaving it reusable.
    pub async fn wait_with_cancel<F>(&self, cancel: F) -> Result<(), SignalError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        tokio::select! {
            biased;
            () = &mut cancel => Err(SignalError::Cancelled),
            result = self.wait() => result,
        }
    }

    /// Resume the pending waiter, if there is one.
    ///
    /// Returns true if a pending wait transitioned to Completed. Completing
    /// with no outstanding wait is a no-op returning false; the result is not
    /// latched for the next wait.
    pub fn complete(&self) -> bool {
        let mut shared = self.shared.lock().unwrap();
        match shared.state {
            State::Pending => {
                shared.state = State::Completed;
                if let Some(waker) = shared.waker.take() {
                    waker.wake();
                }
                true
            }
            _ => false,
        }
    }

    /// Consume a completion without suspending.
    ///
    /// Fails with [`SignalError::NotReady`] while the source is Idle or still
    /// Pending.
    pub fn try_result(&self) -> Result<(), SignalError> {
        let mut shared = self.shared.lock().unwrap();
        match shared.state {
            State::Completed => {
                shared.state = State::Idle;
                shared.waker = None;
                shared.advance_generation();
                Ok(())
            }
            _ => Err(SignalError::NotReady),
        }
    }

    /// Tear the source down.
    ///
    /// Any pending wait resolves as cancelled and every later wait fails
    /// immediately. Adapters hook their external-signal release here.
    pub fn close(&self) {
        let mut shared = self.shared.lock().unwrap();
        shared.closed = true;
        if shared.state == State::Pending {
            shared.state = State::Idle;
            shared.advance_generation();
        }
        if let Some(waker) = shared.waker.take() {
            waker.wake();
        }
    }
}

impl Default for CompletionSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Future returned by [`CompletionSource::wait`].
pub struct Wait {
    shared: Arc<Mutex<Shared>>,
    token: u16,
    fault: Option<SignalError>,
    finished: bool,
}

impl Future for Wait {
    type Output = Result<(), SignalError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if let Some(fault) = this.fault.take() {
            this.finished = true;
            return Poll::Ready(Err(fault));
        }

        let mut shared = this.shared.lock().unwrap();
        if shared.closed {
            this.finished = true;
            return Poll::Ready(Err(SignalError::Cancelled));
        }
        if shared.generation != this.token {
            this.finished = true;
            return Poll::Ready(Err(SignalError::StaleToken));
        }
        match shared.state {
            State::Completed => {
                shared.state = State::Idle;
                shared.waker = None;
                shared.advance_generation();
                this.finished = true;
                Poll::Ready(Ok(()))
            }
            State::Pending => {
                shared.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            // Only close() disarms under an armed wait, and that is handled
            // above; reaching Idle with a matching token means the handle
            // outlived its cycle.
            State::Idle => {
                this.finished = true;
                Poll::Ready(Err(SignalError::StaleToken))
            }
        }
    }
}

impl Drop for Wait {
    fn drop(&mut self) {
        if self.finished || self.fault.is_some() {
            return;
        }
        let mut shared = self.shared.lock().unwrap();
        if shared.generation == self.token && shared.state != State::Idle {
            shared.state = State::Idle;
            shared.waker = None;
            shared.advance_generation();
        }
    }
}
