//! The `AuditStore` trust boundary (§2, §4.5).

use casf_contracts::error::CasfResult;
use casf_contracts::response::Decision;
use serde_json::Value;
use uuid::Uuid;

use crate::event::AuditEvent;

/// Transactional, hash-chained append to a durable store, serialized by a
/// process-global advisory lock (§4.5 Append protocol).
///
/// Implementations are responsible for steps 2–6 of the append protocol:
/// given the caller's `actor`/`action`/`decision`/`payload`, they must
/// serialize against other writers, read the previous event's `hash`,
/// generate `event_id` and `ts`, compute `hash` per the rigid contract,
/// and commit the row before returning.
pub trait AuditStore: Send + Sync {
    /// Append one event for `request_id` and return the committed event
    /// (with `event_id`, `ts`, `prev_hash`, and `hash` populated).
    fn append(
        &self,
        request_id: Uuid,
        actor: &str,
        action: &str,
        decision: Decision,
        payload: Value,
    ) -> CasfResult<AuditEvent>;

    /// All events in append (durable id) order.
    fn all_events(&self) -> CasfResult<Vec<AuditEvent>>;
}
