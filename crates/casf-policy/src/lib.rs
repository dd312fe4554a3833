//! # casf-policy
//!
//! The external policy evaluator boundary (§4.4): the `PolicyClient` trait,
//! a blocking HTTP implementation, and the classified error taxonomy used
//! as a metrics dimension.

pub mod client;
pub mod http;
pub mod mock;

pub use client::{PolicyClient, PolicyError, PolicyErrorKind, PolicyVerdict};
pub use http::HttpPolicyClient;
pub use mock::MockPolicyClient;
