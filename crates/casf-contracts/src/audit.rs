//! The `AuditEvent` data model (§3).
//!
//! The hash contract itself — computing and verifying `hash`/`prev_hash` —
//! is implemented in `casf-audit`, which owns the chain and the store. This
//! module only defines the shape of one event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::response::Decision;

/// The literal `action` recorded for a best-effort replay audit entry.
pub const REPLAY_DETECTED: &str = "REPLAY_DETECTED";

/// One row of the append-only, hash-chained audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub request_id: Uuid,
    pub ts: DateTime<Utc>,
    /// `"role:" + role`.
    pub actor: String,
    /// The tool name, or the literal [`REPLAY_DETECTED`].
    pub action: String,
    pub decision: Decision,
    /// Request + response, nested, as a structured object.
    pub payload: Value,
    /// Empty string for the genesis event, else the predecessor's `hash`.
    pub prev_hash: String,
    pub hash: String,
}
