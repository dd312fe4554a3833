//! A deterministic `PolicyClient` for tests.

use std::sync::Mutex;

use casf_contracts::request::VerifyRequest;

use crate::client::{PolicyClient, PolicyError, PolicyErrorKind, PolicyVerdict};

enum Script {
    Allow,
    Deny(Vec<String>),
    Error(PolicyErrorKind),
}

/// Returns a fixed verdict or error on every call.
pub struct MockPolicyClient {
    script: Mutex<Script>,
}

impl MockPolicyClient {
    pub fn allow() -> Self {
        Self {
            script: Mutex::new(Script::Allow),
        }
    }

    pub fn deny(violations: Vec<String>) -> Self {
        Self {
            script: Mutex::new(Script::Deny(violations)),
        }
    }

    pub fn error(kind: PolicyErrorKind) -> Self {
        Self {
            script: Mutex::new(Script::Error(kind)),
        }
    }
}

impl PolicyClient for MockPolicyClient {
    fn evaluate(&self, _request: &VerifyRequest) -> Result<PolicyVerdict, PolicyError> {
        match &*self.script.lock().expect("mock policy lock poisoned") {
            Script::Allow => Ok(PolicyVerdict {
                allow: true,
                violations: Vec::new(),
            }),
            Script::Deny(violations) => Ok(PolicyVerdict {
                allow: false,
                violations: violations.clone(),
            }),
            Script::Error(kind) => Err(PolicyError {
                kind: *kind,
                reason: "mock policy error".to_string(),
            }),
        }
    }
}
