//! The `IdempotencyStore` and `RateLimiter` trust boundaries (§2, §4.2).
//!
//! Both traits model a remote key-value store exposing atomic primitives —
//! `check_and_claim`/`store_decision` for the idempotency gate,
//! `increment` for the SMS rate limiter. Implementations must be atomic
//! against concurrent callers; the pipeline never does check-then-set at a
//! higher layer (§4.2).

use std::time::Duration;

use casf_contracts::error::CasfResult;
use casf_contracts::response::VerifyResponse;
use uuid::Uuid;

/// The result of an atomic `check_and_claim`.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// No entry existed; one was claimed with the given fingerprint.
    New,
    /// An entry already existed for this `request_id`.
    Existing {
        fp: String,
        /// `None` while the original request is still in flight.
        decision: Option<VerifyResponse>,
    },
}

/// Atomic anti-replay / idempotency primitives (§4.2).
///
/// Implementations must perform both operations as single round-trips,
/// atomic against concurrent callers — e.g. a server-side script on a
/// remote key-value store.
pub trait IdempotencyStore: Send + Sync {
    /// If no entry exists for `request_id`, atomically store
    /// `{fp, decision: None}` with the given TTL and return
    /// [`ClaimOutcome::New`]. Otherwise return the existing entry.
    fn check_and_claim(
        &self,
        request_id: Uuid,
        fp: &str,
        ttl: Duration,
    ) -> CasfResult<ClaimOutcome>;

    /// Update the existing entry's `decision` field, preserving its
    /// original TTL. A no-op if the entry is gone.
    fn store_decision(
        &self,
        request_id: Uuid,
        fp: &str,
        decision: &VerifyResponse,
    ) -> CasfResult<()>;
}

/// Atomic increment-with-expiry, the primitive behind the SMS rate
/// limiter (§4.3 rule 4).
pub trait RateLimiter: Send + Sync {
    /// Atomically increment the counter at `key` by 1, setting its TTL to
    /// `window` if this call created the counter. Returns the counter's
    /// value after the increment.
    fn increment(&self, key: &str, window: Duration) -> CasfResult<u64>;
}
