//! Runtime error types for the CASF verification gateway.
//!
//! All fallible operations across the workspace return `CasfResult<T>`.
//! These never cross into a `VerifyResponse` directly — the pipeline
//! translates them into violation codes (§4.6, §7); this type exists so
//! components have something uniform to propagate with `?` on the way there.

use thiserror::Error;

/// The unified error type for the CASF runtime.
#[derive(Debug, Error)]
pub enum CasfError {
    /// The idempotency / rate-limit store could not complete an operation.
    #[error("idempotency store error: {reason}")]
    Store { reason: String },

    /// The external policy evaluator could not be reached or returned
    /// something the client could not interpret.
    #[error("policy engine error: {reason}")]
    Policy { reason: String },

    /// The audit log could not accept an append.
    #[error("audit log error: {reason}")]
    Audit { reason: String },

    /// A required configuration value was missing or failed to parse.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the workspace.
pub type CasfResult<T> = Result<T, CasfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = CasfError::Store {
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("idempotency store error"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn policy_error_display() {
        let err = CasfError::Policy {
            reason: "deadline exceeded".to_string(),
        };
        assert!(err.to_string().contains("policy engine error"));
    }

    #[test]
    fn audit_error_display() {
        let err = CasfError::Audit {
            reason: "advisory lock timeout".to_string(),
        };
        assert!(err.to_string().contains("audit log error"));
    }

    #[test]
    fn config_error_display() {
        let err = CasfError::Config {
            reason: "POLICY_ENGINE_URL not set".to_string(),
        };
        assert!(err.to_string().contains("configuration error"));
    }
}
