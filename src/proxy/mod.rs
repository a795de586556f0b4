// ABOUTME: Proxy module - forward references to coroutine output streams.
// ABOUTME: Lets mutually-dependent coroutines obtain each other's streams before either runs.

mod proxy;

pub use proxy::{CoroutineProxy, CoroutineStream};
