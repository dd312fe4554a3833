//! Stable violation codes.
//!
//! These strings are part of the wire contract — callers match on them.
//! Never rename one; add a new code instead.

/// Schema-level rejection: `subject.patient_id` missing or empty.
pub const BAD_REQUEST_MISSING_PATIENT_ID: &str = "BadRequest_MissingPatientId";
/// A write tool was attempted while `mode` was `READ_ONLY` or `KILL_SWITCH`.
pub const INV_NO_WRITE_SAFE: &str = "Inv_NoWriteSafe";
/// SMS rate limit exceeded, or the limiter could not be consulted.
pub const INV_NO_SMS_BURST: &str = "Inv_NoSmsBurst";
/// Same `request_id` seen with a different request body.
pub const INV_REPLAY_PAYLOAD_MISMATCH: &str = "Inv_ReplayPayloadMismatch";
/// Same `request_id` currently in flight (claimed, decision not yet stored).
pub const INV_REPLAY_CONCURRENT: &str = "Inv_ReplayConcurrent";
/// The idempotency store could not be reached to check for a replay.
pub const INV_REPLAY_CHECK_UNAVAILABLE: &str = "Inv_ReplayCheckUnavailable";
/// Accompanies another code whenever the cause is infrastructure, not policy.
pub const FAIL_CLOSED: &str = "FAIL_CLOSED";
/// The policy engine could not be reached.
pub const OPA_UNAVAILABLE: &str = "OPA_Unavailable";
/// The policy engine denied with no violation codes of its own.
pub const OPA_DENY: &str = "OPA_Deny";
/// The audit log could not accept the append for the final decision.
pub const AUDIT_UNAVAILABLE: &str = "Audit_Unavailable";

/// Deduplicate `codes` in first-seen order.
///
/// Violation lists must be stable and non-repeating (§3); this is the one
/// place that invariant is enforced rather than trusted to every call site.
pub fn dedup_in_order(codes: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(codes.len());
    codes
        .into_iter()
        .filter(|c| seen.insert(c.clone()))
        .collect()
}
