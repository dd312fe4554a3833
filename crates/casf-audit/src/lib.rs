//! # casf-audit
//!
//! The hash-chained, tamper-evident audit log (§3, §4.5): the rigid hash
//! contract, the chain/window verifiers, the `AuditStore` trust boundary,
//! an in-memory reference implementation, and the daily digest builder.

pub mod chain;
pub mod digest;
pub mod event;
pub mod memory;
pub mod traits;

pub use chain::{compute_hash, recompute, verify_chain, verify_window};
pub use digest::{build_digest, DigestReport};
pub use event::{AuditEvent, REPLAY_DETECTED};
pub use memory::InMemoryAuditStore;
pub use traits::AuditStore;
