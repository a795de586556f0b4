// ABOUTME: Defines all error types for the weave library using thiserror.
// ABOUTME: Misuse of the primitives is a fatal fault; Cancelled is a clean unwind.

use std::sync::Arc;

/// Top-level error type for the weave library.
///
/// `Cancelled` is expected and cooperative; callers treat it as a clean stop.
/// Everything else is terminal for the current run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WeaveError {
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),

    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    /// A coroutine body raised an error. The original cause is preserved and
    /// shared, so the same fault can be observed by a stream reader and by
    /// the runner's caller.
    #[error("coroutine failed: {0}")]
    Producer(Arc<anyhow::Error>),

    /// The per-step sink raised an error.
    #[error("step sink failed: {0}")]
    Sink(Arc<anyhow::Error>),

    #[error("operation cancelled")]
    Cancelled,
}

impl WeaveError {
    /// Wrap a coroutine body fault.
    pub fn producer(err: anyhow::Error) -> Self {
        WeaveError::Producer(Arc::new(err))
    }

    /// Wrap a step sink fault.
    pub fn sink(err: anyhow::Error) -> Self {
        WeaveError::Sink(Arc::new(err))
    }
}

/// Errors from the completion source primitive.
///
/// `StaleToken`, `MultipleContinuation`, and `NotReady` indicate misuse of the
/// primitive and are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("wait token is stale")]
    StaleToken,

    #[error("a continuation is already registered")]
    MultipleContinuation,

    #[error("completion is not ready")]
    NotReady,

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors from coroutine proxy misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProxyError {
    #[error("proxy already has a running producer")]
    AlreadyRunning,

    #[error("proxy stream was already claimed by a reader")]
    AlreadyResolved,
}
