// ABOUTME: Driver module - the external loops that advance coroutines.
// ABOUTME: Contains the step driver and the minimum-interval pacer.

mod driver;
mod pacer;

pub use driver::{Driver, StepSink, drive_each};
pub use pacer::{Cancelled, Pacer};

#[cfg(test)]
mod pacer_test;
