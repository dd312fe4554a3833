//! # casf-store
//!
//! The idempotency / anti-replay store and the SMS rate limiter (§2, §4.2,
//! §4.3 rule 4). Both are modeled as remote key-value stores exposing
//! atomic primitives; this crate provides the trait boundary plus an
//! in-memory reference implementation for tests and the demo binary.

pub mod memory;
pub mod traits;

pub use memory::{InMemoryIdempotencyStore, InMemoryRateLimiter};
pub use traits::{ClaimOutcome, IdempotencyStore, RateLimiter};
