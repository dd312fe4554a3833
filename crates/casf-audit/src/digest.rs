//! The daily digest builder (§4.5).
//!
//! Pure function of a date window and the events already narrowed to it —
//! no file or database access, so it is trivially unit-testable and the
//! `digest` binary is a thin CLI wrapper around it, the same split as the
//! original `export_digest()` / `main()` pair.

use casf_contracts::canonical::canonical_json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest as _, Sha256};

use crate::chain::verify_window;
use crate::event::AuditEvent;

/// The signed digest for one UTC date window (§4.5, §6). Anchoring value is
/// `digest_hash`; everything else lets an independent verifier check it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestReport {
    pub window: String,
    pub event_count: usize,
    pub first_hash: Option<String>,
    pub last_hash: Option<String>,
    pub chain_valid: bool,
    pub digest_hash: String,
}

/// Build the digest for `window` from `events`, already narrowed to that
/// UTC date in ascending durable-id order.
///
/// An empty window hashes to the canonical constant `SHA256("empty:" +
/// window)` rather than hashing an empty payload object, so two different
/// empty windows never collide and the value still commits to which window
/// was checked.
pub fn build_digest(window: &str, events: &[AuditEvent]) -> DigestReport {
    if events.is_empty() {
        return DigestReport {
            window: window.to_string(),
            event_count: 0,
            first_hash: None,
            last_hash: None,
            chain_valid: true,
            digest_hash: sha256_hex(format!("empty:{window}").as_bytes()),
        };
    }

    let (chain_valid, _first_bad_index) = verify_window(events);
    let first_hash = events.first().expect("checked non-empty above").hash.clone();
    let last_hash = events.last().expect("checked non-empty above").hash.clone();

    let payload = json!({
        "window": window,
        "event_count": events.len(),
        "first_hash": first_hash,
        "last_hash": last_hash,
        "chain_valid": chain_valid,
    });
    let digest_hash = sha256_hex(canonical_json(&payload).as_bytes());

    DigestReport {
        window: window.to_string(),
        event_count: events.len(),
        first_hash: Some(first_hash),
        last_hash: Some(last_hash),
        chain_valid,
        digest_hash,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use casf_contracts::response::Decision;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(prev_hash: &str, hash: &str) -> AuditEvent {
        AuditEvent {
            event_id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            ts: Utc::now(),
            actor: "role:nurse".to_string(),
            action: "cliniccloud.summary_history".to_string(),
            decision: Decision::Allow,
            payload: json!({}),
            prev_hash: prev_hash.to_string(),
            hash: hash.to_string(),
        }
    }

    #[test]
    fn empty_window_hashes_the_canonical_empty_constant() {
        let report = build_digest("2026-07-27", &[]);
        assert!(report.chain_valid);
        assert_eq!(report.event_count, 0);
        assert_eq!(report.first_hash, None);
        assert_eq!(report.digest_hash, sha256_hex(b"empty:2026-07-27"));
    }

    #[test]
    fn two_different_empty_windows_do_not_collide() {
        let a = build_digest("2026-07-27", &[]);
        let b = build_digest("2026-07-28", &[]);
        assert_ne!(a.digest_hash, b.digest_hash);
    }

    #[test]
    fn digest_hash_is_deterministic_for_the_same_window() {
        let events = vec![event("", "h0"), event("h0", "h1")];
        let a = build_digest("2026-07-27", &events);
        let b = build_digest("2026-07-27", &events);
        assert_eq!(a.digest_hash, b.digest_hash);
    }

    #[test]
    fn first_and_last_hash_bookend_the_window() {
        let events = vec![event("", "h0"), event("h0", "h1"), event("h1", "h2")];
        let report = build_digest("2026-07-27", &events);
        assert_eq!(report.first_hash.as_deref(), Some("h0"));
        assert_eq!(report.last_hash.as_deref(), Some("h2"));
        assert_eq!(report.event_count, 3);
    }

    #[test]
    fn broken_linkage_is_reported_but_still_digested() {
        let events = vec![event("", "h0"), event("not-h0", "h1")];
        let report = build_digest("2026-07-27", &events);
        assert!(!report.chain_valid);
        assert!(!report.digest_hash.is_empty());
    }
}
