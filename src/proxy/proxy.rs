// ABOUTME: Stream proxy that resolves to a coroutine's live output stream at producer start.
// ABOUTME: Breaks the chicken-and-egg cycle between mutually-referencing coroutines.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use futures::stream::{Stream, StreamExt};
use tokio::sync::{mpsc, oneshot};

use crate::error::{ProxyError, WeaveError};
use crate::signal::CancelSignal;

/// Read end of a coroutine's output queue.
///
/// Items arrive in emission order. A producer fault is observed in-band after
/// the last good item; normal completion is observed as end-of-stream.
pub struct CoroutineStream<T> {
    receiver: mpsc::UnboundedReceiver<Result<T, WeaveError>>,
}

impl<T> Stream for CoroutineStream<T> {
    type Item = Result<T, WeaveError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}

/// A forward reference to a coroutine's output stream.
///
/// Create the proxy before the coroutine starts, hand it to whoever needs the
/// stream, then drive the coroutine through [`run`](Self::run). Resolution is
/// a side effect of the producer *starting*, not finishing: `run` publishes
/// the queue's read end before the coroutine body executes a single step.
/// That is what lets two coroutines reference each other's streams without
/// deadlocking - both `run` calls reach their publish step before either body
/// needs the other's stream.
///
/// One producer and, by default, one reader per proxy.
pub struct CoroutineProxy<T> {
    publish: Mutex<Option<oneshot::Sender<CoroutineStream<T>>>>,
    claim: Mutex<Option<oneshot::Receiver<CoroutineStream<T>>>>,
}

impl<T: Send + 'static> CoroutineProxy<T> {
    pub fn new() -> Self {
        let (publish, claim) = oneshot::channel();
        Self {
            publish: Mutex::new(Some(publish)),
            claim: Mutex::new(Some(claim)),
        }
    }

    /// Wait until the producer has published its stream.
    ///
    /// If `cancel` fires first the resolve completes as `Cancelled`, and a
    /// later publish on this proxy is rejected rather than silently latched:
    /// the producer's `run` observes the rejection and unwinds.
    pub async fn resolve<F>(&self, cancel: F) -> Result<CoroutineStream<T>, WeaveError>
    where
        F: Future<Output = ()>,
    {
        let claim = self
            .claim
            .lock()
            .unwrap()
            .take()
            .ok_or(ProxyError::AlreadyResolved)?;
        tokio::pin!(cancel);

        tokio::select! {
            biased;
            // Dropping the claim here is what rejects a later publish.
            () = &mut cancel => Err(WeaveError::Cancelled),
            published = claim => published.map_err(|_| WeaveError::Cancelled),
        }
    }

    /// Publish this proxy's stream and drive the coroutine to completion.
    ///
    /// Every value the body produces is forwarded FIFO into the stream. On
    /// normal completion the write end closes and readers observe
    /// end-of-stream. A body fault is forwarded to the reader behind the last
    /// good item and re-raised to this call's own caller. Exactly one `run`
    /// is allowed per proxy.
    pub async fn run<F, S>(&self, coroutine: F, cancel: CancelSignal) -> Result<(), WeaveError>
    where
        F: FnOnce(CancelSignal) -> S,
        S: Stream<Item = Result<T, anyhow::Error>>,
    {
        let publish = self
            .publish
            .lock()
            .unwrap()
            .take()
            .ok_or(ProxyError::AlreadyRunning)?;
        if cancel.is_cancelled() {
            return Err(WeaveError::Cancelled);
        }

        let (forward, receiver) = mpsc::unbounded_channel();
        // Publish before the body runs a single step; resolution depends only
        // on the queue existing, never on first output.
        if publish.send(CoroutineStream { receiver }).is_err() {
            // The reader's resolve was cancelled; nothing can observe this run.
            return Err(WeaveError::Cancelled);
        }

        let body = coroutine(cancel.clone());
        tokio::pin!(body);
        loop {
            let item = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(WeaveError::Cancelled),
                item = body.next() => item,
            };
            match item {
                Some(Ok(value)) => {
                    // A departed reader is not a fault; emission order still
                    // holds for anyone left.
                    let _ = forward.send(Ok(value));
                }
                Some(Err(cause)) => {
                    let fault = WeaveError::Producer(Arc::new(cause));
                    let _ = forward.send(Err(fault.clone()));
                    return Err(fault);
                }
                // The write end drops here; readers observe end-of-stream.
                None => return Ok(()),
            }
        }
    }
}

impl<T: Send + 'static> Default for CoroutineProxy<T> {
    fn default() -> Self {
        Self::new()
    }
}
