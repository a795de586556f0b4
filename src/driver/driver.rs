// ABOUTME: The external control loop that advances combined coroutines step by step.
// ABOUTME: Pulls are gated on timer ticks; cancellation is checked around every pull.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{Stream, StreamExt};

use super::pacer::Pacer;
use crate::error::{SignalError, WeaveError};
use crate::sequence::combine;
use crate::signal::{CancelSignal, TickSource};

/// Per-step output sink.
///
/// The driver hands over each produced value and awaits the sink before
/// pulling again; what the sink does with the value is its own business.
/// Implemented for free by any `FnMut(T)` closure.
#[async_trait]
pub trait StepSink<T: Send + 'static>: Send {
    async fn on_step(&mut self, value: T) -> anyhow::Result<()>;
}

#[async_trait]
impl<T, F> StepSink<T> for F
where
    T: Send + 'static,
    F: FnMut(T) + Send,
{
    async fn on_step(&mut self, value: T) -> anyhow::Result<()> {
        self(value);
        Ok(())
    }
}

/// The external loop that interleaves a set of coroutines, one step per tick.
///
/// Cancellation stops it cleanly; exhaustion of all coroutines restarts the
/// whole cycle ([`run`](Self::run)) or ends the current one
/// ([`run_once`](Self::run_once)); any other fault is surfaced without
/// retrying.
pub struct Driver {
    period: Duration,
}

impl Driver {
    /// Create a driver that advances one combined step per `period`.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Drive cycles forever: rebuild the sources and start over on normal
    /// exhaustion, return `Ok` on cancellation, surface any other fault.
    pub async fn run<T, S, M, K>(
        &self,
        mut make_sources: M,
        sink: &mut K,
        cancel: CancelSignal,
    ) -> Result<(), WeaveError>
    where
        T: Send + 'static,
        S: Stream<Item = Result<T, WeaveError>>,
        M: FnMut() -> Vec<S>,
        K: StepSink<T> + ?Sized,
    {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }
            match self.run_once(make_sources(), &mut *sink, &cancel).await {
                Ok(()) => {}
                Err(WeaveError::Cancelled) => return Ok(()),
                Err(fault) => return Err(fault),
            }
        }
    }

    /// One cycle: pull the combined sequence to exhaustion, one value per
    /// tick, feeding each value to the sink.
    pub async fn run_once<T, S, K>(
        &self,
        sources: Vec<S>,
        sink: &mut K,
        cancel: &CancelSignal,
    ) -> Result<(), WeaveError>
    where
        T: Send + 'static,
        S: Stream<Item = Result<T, WeaveError>>,
        K: StepSink<T> + ?Sized,
    {
        let combined = combine(sources);
        tokio::pin!(combined);

        // Ticker torn down when the cycle exits, on every path.
        let ticks = TickSource::new(self.period);

        loop {
            if cancel.is_cancelled() {
                return Err(WeaveError::Cancelled);
            }
            ticks
                .next_tick_with_cancel(cancel.cancelled())
                .await
                .map_err(|err| match err {
                    SignalError::Cancelled => WeaveError::Cancelled,
                    other => WeaveError::Signal(other),
                })?;

            let step = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(WeaveError::Cancelled),
                step = combined.next() => step,
            };
            match step {
                Some(Ok(value)) => {
                    sink.on_step(value).await.map_err(WeaveError::sink)?;
                }
                Some(Err(fault)) => return Err(fault),
                None => return Ok(()),
            }
        }
    }
}

/// Drive each stream in its own paced loop, concurrently, until all finish.
///
/// Each stream gets its own [`Pacer`], so its items are spaced at least
/// `min_interval` apart regardless of how the others progress; output happens
/// inside the coroutine bodies themselves. The first fault (or cancellation)
/// stops the rest.
pub async fn drive_each<T, S>(
    streams: Vec<S>,
    min_interval: Duration,
    cancel: CancelSignal,
) -> Result<(), WeaveError>
where
    S: Stream<Item = Result<T, WeaveError>>,
{
    let workers = streams.into_iter().map(|stream| {
        let cancel = cancel.clone();
        async move {
            let pacer = Pacer::new();
            tokio::pin!(stream);
            loop {
                let step = tokio::select! {
                    biased;
                    () = cancel.cancelled() => return Err(WeaveError::Cancelled),
                    step = stream.next() => step,
                };
                match step {
                    Some(Ok(_)) => {
                        pacer
                            .wait(min_interval, cancel.cancelled())
                            .await
                            .map_err(|_| WeaveError::Cancelled)?;
                    }
                    Some(Err(fault)) => return Err(fault),
                    None => return Ok(()),
                }
            }
        }
    });

    futures::future::try_join_all(workers).await.map(|_| ())
}
