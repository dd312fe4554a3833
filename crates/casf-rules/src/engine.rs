//! The pure in-process rule engine (§4.3).
//!
//! `evaluate` is a pure function of the request and the rate limiter: same
//! inputs (including the limiter's observed counter) always produce the
//! same preliminary decision. It never touches the idempotency store, the
//! policy client, or the audit log — those are the pipeline's job.

use casf_contracts::codes::{BAD_REQUEST_MISSING_PATIENT_ID, FAIL_CLOSED, INV_NO_SMS_BURST, INV_NO_WRITE_SAFE};
use casf_contracts::request::{Mode, Tool, VerifyRequest};
use casf_contracts::response::VerifyResponse;
use casf_store::RateLimiter;
use tracing::{debug, warn};

use crate::limits::SmsLimits;
use crate::projections::read_only_allowed;

/// Evaluate the five rules of §4.3 in order and return the first
/// terminating decision.
///
/// `rate_limiter` is `None` only to model an unconfigured or previously
/// failed limiter — the SMS rule treats that the same as a runtime error
/// from the limiter: fail-closed.
pub fn evaluate(
    request: &VerifyRequest,
    rate_limiter: Option<&dyn RateLimiter>,
    sms_limits: &SmsLimits,
) -> VerifyResponse {
    // Rule 1: traceability.
    if !request.subject.has_patient_id() {
        debug!(request_id = %request.request_id, "rule engine: missing patient_id");
        return VerifyResponse::deny(
            vec![BAD_REQUEST_MISSING_PATIENT_ID.to_string()],
            "missing subject.patient_id",
        );
    }

    // Rule 2: safe-mode write ban.
    let safe_mode = matches!(request.mode, Mode::ReadOnly | Mode::KillSwitch);
    if safe_mode && request.tool.is_write() {
        debug!(request_id = %request.request_id, tool = %request.tool, "rule engine: write banned in safe mode");
        return VerifyResponse::deny(
            vec![INV_NO_WRITE_SAFE.to_string()],
            format!("{} is a write tool and mode forbids writes", request.tool),
        );
    }

    // Rule 3: degraded read.
    if matches!(request.mode, Mode::ReadOnly) {
        if let Some(projections) = read_only_allowed(request.tool) {
            return VerifyResponse {
                decision: casf_contracts::response::Decision::Allow,
                violations: Vec::new(),
                allowed_outputs: projections.iter().map(|s| s.to_string()).collect(),
                reason: "OK (READ_ONLY degraded output)".to_string(),
            };
        }
    }

    // Rule 4: SMS rate limit.
    if request.tool == Tool::SendSms {
        let (limit, window) = sms_limits.for_tenant(&request.context.tenant_id);
        let key = format!(
            "sms:{}:{}",
            request.context.tenant_id, request.subject.patient_id
        );

        let count = match rate_limiter {
            None => {
                warn!(request_id = %request.request_id, "rule engine: rate limiter unavailable");
                None
            }
            Some(limiter) => match limiter.increment(&key, window) {
                Ok(count) => Some(count),
                Err(err) => {
                    warn!(request_id = %request.request_id, error = %err, "rule engine: rate limiter error");
                    None
                }
            },
        };

        match count {
            None => {
                return VerifyResponse::deny(
                    vec![FAIL_CLOSED.to_string(), INV_NO_SMS_BURST.to_string()],
                    "rate limiter unavailable",
                );
            }
            Some(count) if count > limit => {
                return VerifyResponse::deny(
                    vec![INV_NO_SMS_BURST.to_string()],
                    format!("sms burst limit of {limit} per {:?} exceeded", window),
                );
            }
            Some(_) => {}
        }
    }

    // Rule 5: default.
    VerifyResponse::allow("OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use casf_contracts::request::{Context, Role, Subject};
    use casf_contracts::response::Decision;
    use casf_store::InMemoryRateLimiter;
    use serde_json::Map;
    use std::time::Duration;
    use uuid::Uuid;

    fn base_request(tool: Tool, mode: Mode, patient_id: &str) -> VerifyRequest {
        VerifyRequest {
            request_id: Uuid::new_v4(),
            tool,
            mode,
            role: Role::Receptionist,
            subject: Subject {
                patient_id: patient_id.to_string(),
                extra: Map::new(),
            },
            args: Map::new(),
            context: Context {
                tenant_id: "t1".to_string(),
                timestamp: None,
                source: None,
                session_id: None,
                ip: None,
                extra: Map::new(),
            },
        }
    }

    #[test]
    fn missing_patient_id_denies() {
        let request = base_request(Tool::ListAppointments, Mode::Allow, "");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Deny);
        assert_eq!(result.violations, vec!["BadRequest_MissingPatientId"]);
    }

    #[test]
    fn write_tool_in_read_only_mode_is_denied() {
        let request = base_request(Tool::CreateAppointment, Mode::ReadOnly, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Deny);
        assert_eq!(result.violations, vec!["Inv_NoWriteSafe"]);
    }

    #[test]
    fn write_tool_in_kill_switch_mode_is_denied() {
        let request = base_request(Tool::SendSms, Mode::KillSwitch, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.violations, vec!["Inv_NoWriteSafe"]);
    }

    #[test]
    fn degraded_read_allows_list_appointments() {
        let request = base_request(Tool::ListAppointments, Mode::ReadOnly, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.allowed_outputs, vec!["slots_aggregated"]);
        assert_eq!(result.reason, "OK (READ_ONLY degraded output)");
    }

    #[test]
    fn read_only_mode_without_projection_falls_through_to_write_ban_or_allow() {
        let request = base_request(Tool::SummaryHistory, Mode::ReadOnly, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Allow);
        assert!(result.allowed_outputs.is_empty());
    }

    #[test]
    fn sms_within_limit_allows() {
        let request = base_request(Tool::SendSms, Mode::Allow, "p1");
        let limiter = InMemoryRateLimiter::new();
        let limits = SmsLimits::new(1, Duration::from_secs(3600));
        let result = evaluate(&request, Some(&limiter), &limits);
        assert_eq!(result.decision, Decision::Allow);
    }

    #[test]
    fn sms_second_request_in_window_denies_burst() {
        let limiter = InMemoryRateLimiter::new();
        let limits = SmsLimits::new(1, Duration::from_secs(3600));

        let first = base_request(Tool::SendSms, Mode::Allow, "p1");
        let second = base_request(Tool::SendSms, Mode::Allow, "p1");

        assert_eq!(evaluate(&first, Some(&limiter), &limits).decision, Decision::Allow);
        let result = evaluate(&second, Some(&limiter), &limits);
        assert_eq!(result.decision, Decision::Deny);
        assert_eq!(result.violations, vec!["Inv_NoSmsBurst"]);
    }

    #[test]
    fn sms_without_limiter_fails_closed() {
        let request = base_request(Tool::SendSms, Mode::Allow, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Deny);
        assert_eq!(result.violations, vec!["FAIL_CLOSED", "Inv_NoSmsBurst"]);
    }

    #[test]
    fn default_rule_allows_with_ok_reason() {
        let request = base_request(Tool::SummaryHistory, Mode::Allow, "p1");
        let limits = SmsLimits::default();
        let result = evaluate(&request, None, &limits);
        assert_eq!(result.decision, Decision::Allow);
        assert_eq!(result.reason, "OK");
    }
}
