//! `VerifyResponse` and the `Decision` enum.

use serde::{Deserialize, Serialize};

/// The gateway's verdict for one `VerifyRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "ALLOW")]
    Allow,
    #[serde(rename = "DENY")]
    Deny,
    #[serde(rename = "NEEDS_APPROVAL")]
    NeedsApproval,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
            Decision::NeedsApproval => "NEEDS_APPROVAL",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the pipeline hands back to the caller (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub decision: Decision,
    /// Stable codes, deduplicated in first-seen order (§4.6 Stage C, §7).
    #[serde(default)]
    pub violations: Vec<String>,
    /// Permitted output projections. Non-empty only for degraded-read allows.
    #[serde(default)]
    pub allowed_outputs: Vec<String>,
    pub reason: String,
}

impl VerifyResponse {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Allow,
            violations: Vec::new(),
            allowed_outputs: Vec::new(),
            reason: reason.into(),
        }
    }

    pub fn deny(violations: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            decision: Decision::Deny,
            violations: crate::codes::dedup_in_order(violations),
            allowed_outputs: Vec::new(),
            reason: reason.into(),
        }
    }
}
