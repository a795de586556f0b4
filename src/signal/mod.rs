// ABOUTME: Signal module - completion sources and the adapters that drive them.
// ABOUTME: Contains the single-shot awaitable, cancellation, timer, and idle signals.

mod cancel;
mod completion;
mod idle;
mod tick;

pub use cancel::CancelSignal;
pub use completion::{CompletionSource, Wait};
pub use idle::{IdleCallback, IdleSignal, SubscriptionId, Yielder};
pub use tick::TickSource;

#[cfg(test)]
mod completion_test;
