// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use weave::prelude::*;` to get started quickly.

pub use crate::driver::{Driver, Pacer, StepSink, drive_each};
pub use crate::error::{ProxyError, SignalError, WeaveError};
pub use crate::proxy::{CoroutineProxy, CoroutineStream};
pub use crate::sequence::combine;
pub use crate::signal::{
    CancelSignal, CompletionSource, IdleCallback, IdleSignal, SubscriptionId, TickSource, Wait,
    Yielder,
};
