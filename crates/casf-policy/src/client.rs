//! The `PolicyClient` trait and its verdict/error types (§4.4).

use casf_contracts::request::VerifyRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The classification label attached to every `PolicyError`, used as a
/// metric dimension (§6 `casf_opa_error_total{kind}`) and nowhere else —
/// the pipeline never branches on `kind` itself, only on whether the call
/// errored at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyErrorKind {
    /// The call exceeded its deadline.
    Timeout,
    /// Connection failure or other transport error.
    Unavailable,
    /// The evaluator responded with an HTTP status >= 400.
    BadStatus,
    /// The response was not JSON, or was missing an expected field.
    BadResponse,
}

impl PolicyErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyErrorKind::Timeout => "timeout",
            PolicyErrorKind::Unavailable => "unavailable",
            PolicyErrorKind::BadStatus => "bad_status",
            PolicyErrorKind::BadResponse => "bad_response",
        }
    }
}

/// An error from a `PolicyClient::evaluate` call.
#[derive(Debug, Error)]
#[error("policy engine error ({kind}): {reason}", kind = self.kind.as_str())]
pub struct PolicyError {
    pub kind: PolicyErrorKind,
    pub reason: String,
}

/// What the external policy evaluator returns for one request (§4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub allow: bool,
    #[serde(default)]
    pub violations: Vec<String>,
}

/// Synchronous call to an external policy evaluator. Implementations are
/// expected to be stateless after construction and safe to call
/// concurrently (§5).
pub trait PolicyClient: Send + Sync {
    fn evaluate(&self, request: &VerifyRequest) -> Result<PolicyVerdict, PolicyError>;
}
