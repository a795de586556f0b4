// ABOUTME: Sequence module - combinators over pull-style lazy sequences.
// ABOUTME: Contains the fairness-preserving round-robin interleaver.

mod combine;

pub use combine::combine;
