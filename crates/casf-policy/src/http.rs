//! A blocking HTTP `PolicyClient` implementation.
//!
//! The default deadline is short (§4.4: "hundreds of milliseconds") — this
//! gate sits on the request-handling hot path, and a slow evaluator must
//! not stall the whole pipeline beyond the budget the caller gave it.

use std::time::Duration;

use casf_contracts::request::VerifyRequest;
use reqwest::blocking::Client;
use tracing::warn;

use crate::client::{PolicyClient, PolicyError, PolicyErrorKind, PolicyVerdict};

/// Default per-call deadline, per §4.4.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(300);

pub struct HttpPolicyClient {
    client: Client,
    url: String,
}

impl HttpPolicyClient {
    /// Build a client posting to `url` with `timeout` as both the connect
    /// and read deadline.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PolicyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PolicyError {
                kind: PolicyErrorKind::Unavailable,
                reason: format!("failed to build policy HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn with_default_timeout(url: impl Into<String>) -> Result<Self, PolicyError> {
        Self::new(url, DEFAULT_TIMEOUT)
    }
}

impl PolicyClient for HttpPolicyClient {
    fn evaluate(&self, request: &VerifyRequest) -> Result<PolicyVerdict, PolicyError> {
        let response = self.client.post(&self.url).json(request).send().map_err(|e| {
            let kind = if e.is_timeout() {
                PolicyErrorKind::Timeout
            } else {
                PolicyErrorKind::Unavailable
            };
            warn!(url = %self.url, kind = kind.as_str(), error = %e, "policy call failed");
            PolicyError {
                kind,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(PolicyError {
                kind: PolicyErrorKind::BadStatus,
                reason: format!("policy engine returned status {status}"),
            });
        }

        response.json::<PolicyVerdict>().map_err(|e| PolicyError {
            kind: PolicyErrorKind::BadResponse,
            reason: format!("could not parse policy response: {e}"),
        })
    }
}
