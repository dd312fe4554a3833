//! Re-exports the `AuditEvent` data type.
//!
//! The shape lives in `casf-contracts` (every crate needs it in its audit
//! payload); this module exists so the rest of `casf-audit` can refer to
//! `crate::event::AuditEvent`, keeping the hashing logic in `chain.rs` split
//! from the event shape itself.

pub use casf_contracts::audit::{AuditEvent, REPLAY_DETECTED};
