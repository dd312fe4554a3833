//! The rigid hash contract and chain verifier (§3, §4.5).
//!
//! ```text
//! hash = SHA256_HEX( request_id ∥ event_id ∥ ts ∥ actor ∥ action ∥ decision
//!                    ∥ canonical_json(payload) ∥ prev_hash )
//! ```
//! Concatenation is raw string concatenation, no separators. Changing the
//! field order or adding a delimiter here changes every hash in the
//! system — do not "clean this up".

use casf_contracts::canonical::canonical_json;
use casf_contracts::response::Decision;
use casf_contracts::time::format_ts;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use crate::event::AuditEvent;

/// Compute `hash` per the rigid contract for one event's fields.
#[allow(clippy::too_many_arguments)]
pub fn compute_hash(
    request_id: Uuid,
    event_id: Uuid,
    ts: &DateTime<Utc>,
    actor: &str,
    action: &str,
    decision: Decision,
    payload: &Value,
    prev_hash: &str,
) -> String {
    let mut preimage = String::new();
    preimage.push_str(&request_id.to_string());
    preimage.push_str(&event_id.to_string());
    preimage.push_str(&format_ts(ts));
    preimage.push_str(actor);
    preimage.push_str(action);
    preimage.push_str(decision.as_str());
    preimage.push_str(&canonical_json(payload));
    preimage.push_str(prev_hash);

    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute `event`'s hash from its own fields.
pub fn recompute(event: &AuditEvent) -> String {
    compute_hash(
        event.request_id,
        event.event_id,
        &event.ts,
        &event.actor,
        &event.action,
        event.decision,
        &event.payload,
        &event.prev_hash,
    )
}

/// Verify a full chain starting at the genesis event (§4.5 Chain verifier).
///
/// Checks, for every index *i*: `prev_hash[i] == hash[i-1]` (or `""` at
/// `i == 0`), and `hash[i]` recomputes to the stored value. Returns
/// `(true, None)` if the whole chain is valid, otherwise `(false, Some(i))`
/// for the first bad index.
pub fn verify_chain(events: &[AuditEvent]) -> (bool, Option<usize>) {
    verify(events, true)
}

/// Verify linkage and integrity within a window whose first event may not
/// be the true genesis — its `prev_hash` points outside the window and is
/// not checked (§4.5 Digest emitter).
pub fn verify_window(events: &[AuditEvent]) -> (bool, Option<usize>) {
    verify(events, false)
}

fn verify(events: &[AuditEvent], check_genesis: bool) -> (bool, Option<usize>) {
    for (i, event) in events.iter().enumerate() {
        if i == 0 {
            if check_genesis && !event.prev_hash.is_empty() {
                return (false, Some(i));
            }
        } else if event.prev_hash != events[i - 1].hash {
            return (false, Some(i));
        }

        if recompute(event) != event.hash {
            return (false, Some(i));
        }
    }
    (true, None)
}
