//! In-memory reference implementations of [`IdempotencyStore`] and
//! [`RateLimiter`].
//!
//! Both keep their state in a `HashMap` behind a `Mutex`, the same shape as
//! `InMemoryAuditWriter` in the audit crate — safe to share across threads
//! via `Arc`, with every operation a single critical section.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use casf_contracts::error::{CasfError, CasfResult};
use casf_contracts::response::VerifyResponse;
use tracing::debug;
use uuid::Uuid;

use crate::traits::{ClaimOutcome, IdempotencyStore, RateLimiter};

struct IdempotencyEntry {
    fp: String,
    decision: Option<VerifyResponse>,
    expires_at: Instant,
}

/// An in-memory idempotency store. Entries past their TTL are treated as
/// absent and overwritten on the next claim.
#[derive(Clone, Default)]
pub struct InMemoryIdempotencyStore {
    entries: Arc<Mutex<HashMap<Uuid, IdempotencyEntry>>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn check_and_claim(
        &self,
        request_id: Uuid,
        fp: &str,
        ttl: Duration,
    ) -> CasfResult<ClaimOutcome> {
        let mut entries = self.entries.lock().map_err(|e| CasfError::Store {
            reason: format!("idempotency state lock poisoned: {e}"),
        })?;

        if let Some(existing) = entries.get(&request_id) {
            if existing.expires_at > Instant::now() {
                debug!(request_id = %request_id, "idempotency entry already claimed");
                return Ok(ClaimOutcome::Existing {
                    fp: existing.fp.clone(),
                    decision: existing.decision.clone(),
                });
            }
        }

        entries.insert(
            request_id,
            IdempotencyEntry {
                fp: fp.to_string(),
                decision: None,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(ClaimOutcome::New)
    }

    fn store_decision(
        &self,
        request_id: Uuid,
        fp: &str,
        decision: &VerifyResponse,
    ) -> CasfResult<()> {
        let mut entries = self.entries.lock().map_err(|e| CasfError::Store {
            reason: format!("idempotency state lock poisoned: {e}"),
        })?;

        if let Some(entry) = entries.get_mut(&request_id) {
            if entry.fp == fp {
                entry.decision = Some(decision.clone());
            }
        }
        Ok(())
    }
}

struct Counter {
    count: u64,
    expires_at: Instant,
}

/// An in-memory rate limiter counting within a fixed window per key.
#[derive(Clone, Default)]
pub struct InMemoryRateLimiter {
    counters: Arc<Mutex<HashMap<String, Counter>>>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn increment(&self, key: &str, window: Duration) -> CasfResult<u64> {
        let mut counters = self.counters.lock().map_err(|e| CasfError::Store {
            reason: format!("rate limiter state lock poisoned: {e}"),
        })?;

        let now = Instant::now();
        let counter = counters.entry(key.to_string()).or_insert(Counter {
            count: 0,
            expires_at: now + window,
        });

        if counter.expires_at <= now {
            counter.count = 0;
            counter.expires_at = now + window;
        }
        counter.count += 1;
        Ok(counter.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn claim_returns_new_then_existing() {
        let store = InMemoryIdempotencyStore::new();
        let id = Uuid::new_v4();

        let first = store.check_and_claim(id, "fp1", Duration::from_secs(60)).unwrap();
        assert_eq!(first, ClaimOutcome::New);

        let second = store.check_and_claim(id, "fp1", Duration::from_secs(60)).unwrap();
        assert_eq!(
            second,
            ClaimOutcome::Existing {
                fp: "fp1".to_string(),
                decision: None
            }
        );
    }

    #[test]
    fn claim_after_ttl_expiry_is_new_again() {
        let store = InMemoryIdempotencyStore::new();
        let id = Uuid::new_v4();
        store
            .check_and_claim(id, "fp1", Duration::from_millis(10))
            .unwrap();
        thread::sleep(Duration::from_millis(30));
        let outcome = store.check_and_claim(id, "fp2", Duration::from_secs(60)).unwrap();
        assert_eq!(outcome, ClaimOutcome::New);
    }

    #[test]
    fn store_decision_updates_existing_entry() {
        let store = InMemoryIdempotencyStore::new();
        let id = Uuid::new_v4();
        store.check_and_claim(id, "fp1", Duration::from_secs(60)).unwrap();

        let decision = VerifyResponse::allow("OK");
        store.store_decision(id, "fp1", &decision).unwrap();

        let outcome = store.check_and_claim(id, "fp1", Duration::from_secs(60)).unwrap();
        match outcome {
            ClaimOutcome::Existing { decision: Some(d), .. } => assert_eq!(d.reason, "OK"),
            other => panic!("expected cached decision, got {other:?}"),
        }
    }

    #[test]
    fn store_decision_is_noop_on_missing_entry() {
        let store = InMemoryIdempotencyStore::new();
        let decision = VerifyResponse::allow("OK");
        store
            .store_decision(Uuid::new_v4(), "fp1", &decision)
            .unwrap();
    }

    #[test]
    fn rate_limiter_increments_within_window() {
        let limiter = InMemoryRateLimiter::new();
        let key = "sms:t1:p1";
        assert_eq!(limiter.increment(key, Duration::from_secs(3600)).unwrap(), 1);
        assert_eq!(limiter.increment(key, Duration::from_secs(3600)).unwrap(), 2);
        assert_eq!(limiter.increment(key, Duration::from_secs(3600)).unwrap(), 3);
    }

    #[test]
    fn rate_limiter_resets_after_window_expires() {
        let limiter = InMemoryRateLimiter::new();
        let key = "sms:t1:p1";
        limiter.increment(key, Duration::from_millis(10)).unwrap();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(limiter.increment(key, Duration::from_secs(3600)).unwrap(), 1);
    }
}
