//! # casf-core
//!
//! The decision pipeline (§4.6): the orchestrator that chains the
//! idempotency gate, the rule engine, the policy client, and the audit log
//! into one `Verify` call, plus the process-local metrics it updates along
//! the way.

pub mod metrics;
pub mod pipeline;

pub use metrics::Metrics;
pub use pipeline::{DecisionPipeline, PipelineConfig, VerifyOutcome};
