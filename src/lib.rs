// ABOUTME: Root module for weave - cooperative coroutine scheduling primitives.
// ABOUTME: Re-exports all public types from submodules.

pub mod driver;
pub mod error;
pub mod prelude;
pub mod proxy;
pub mod sequence;
pub mod signal;

pub use error::WeaveError;
