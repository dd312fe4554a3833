//! In-memory, hash-chained `AuditStore`.
//!
//! The `Mutex` around the event vector is the advisory lock of §4.5: one
//! writer computes the next event's `prev_hash` and pushes it while every
//! other writer blocks, so the chain can never fork.

use std::sync::{Arc, Mutex};

use casf_contracts::error::{CasfError, CasfResult};
use casf_contracts::response::Decision;
use chrono::Utc;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::chain::compute_hash;
use crate::event::AuditEvent;
use crate::traits::AuditStore;

#[derive(Clone, Default)]
pub struct InMemoryAuditStore {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn append(
        &self,
        request_id: Uuid,
        actor: &str,
        action: &str,
        decision: Decision,
        payload: Value,
    ) -> CasfResult<AuditEvent> {
        let mut events = self.events.lock().map_err(|e| CasfError::Audit {
            reason: format!("audit state lock poisoned: {e}"),
        })?;

        let prev_hash = events.last().map(|e| e.hash.clone()).unwrap_or_default();
        let event_id = Uuid::new_v4();
        let ts = Utc::now();

        let hash = compute_hash(
            request_id, event_id, &ts, actor, action, decision, &payload, &prev_hash,
        );

        let event = AuditEvent {
            event_id,
            request_id,
            ts,
            actor: actor.to_string(),
            action: action.to_string(),
            decision,
            payload,
            prev_hash,
            hash,
        };

        events.push(event.clone());
        info!(
            request_id = %request_id,
            event_id = %event_id,
            action,
            decision = %decision,
            "audit event appended"
        );
        Ok(event)
    }

    fn all_events(&self) -> CasfResult<Vec<AuditEvent>> {
        let events = self.events.lock().map_err(|e| CasfError::Audit {
            reason: format!("audit state lock poisoned: {e}"),
        })?;
        Ok(events.clone())
    }
}
