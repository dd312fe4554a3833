//! Per-tenant SMS rate limit configuration (§4.3 rule 4, §6).

use std::collections::HashMap;
use std::time::Duration;

/// Default and per-tenant overrides for the SMS burst limiter.
#[derive(Debug, Clone)]
pub struct SmsLimits {
    default_limit: u64,
    default_window: Duration,
    overrides: HashMap<String, (u64, Duration)>,
}

impl SmsLimits {
    pub fn new(default_limit: u64, default_window: Duration) -> Self {
        Self {
            default_limit,
            default_window,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, tenant_id: impl Into<String>, limit: u64, window: Duration) -> Self {
        self.overrides.insert(tenant_id.into(), (limit, window));
        self
    }

    /// `(limit, window)` for `tenant_id`, falling back to the process
    /// defaults when the tenant has no override.
    pub fn for_tenant(&self, tenant_id: &str) -> (u64, Duration) {
        self.overrides
            .get(tenant_id)
            .copied()
            .unwrap_or((self.default_limit, self.default_window))
    }
}

impl Default for SmsLimits {
    /// 1 per 3600s, the process defaults named in §4.3.
    fn default() -> Self {
        Self::new(1, Duration::from_secs(3600))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_for_unknown_tenant() {
        let limits = SmsLimits::new(1, Duration::from_secs(3600));
        assert_eq!(limits.for_tenant("unknown"), (1, Duration::from_secs(3600)));
    }

    #[test]
    fn override_wins_for_known_tenant() {
        let limits =
            SmsLimits::new(1, Duration::from_secs(3600)).with_override("t1", 5, Duration::from_secs(60));
        assert_eq!(limits.for_tenant("t1"), (5, Duration::from_secs(60)));
        assert_eq!(limits.for_tenant("t2"), (1, Duration::from_secs(3600)));
    }
}
