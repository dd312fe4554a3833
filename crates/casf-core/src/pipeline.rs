//! The decision pipeline orchestrator (§4.6) — the gateway's core.
//!
//! `DecisionPipeline::verify` chains the idempotency gate, the rule engine,
//! the policy client, and the audit log in the strict order and
//! fail-mode policy of §4.6's precedence table. Every external call goes
//! through an injected trait object (§9 "ambient singletons" redesign
//! note) — the pipeline itself holds no I/O state beyond its collaborators
//! and the process-local metrics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use casf_audit::traits::AuditStore;
use casf_contracts::audit::REPLAY_DETECTED;
use casf_contracts::codes::{
    dedup_in_order, AUDIT_UNAVAILABLE, BAD_REQUEST_MISSING_PATIENT_ID, FAIL_CLOSED,
    INV_NO_SMS_BURST, INV_REPLAY_CHECK_UNAVAILABLE, INV_REPLAY_CONCURRENT,
    INV_REPLAY_PAYLOAD_MISMATCH, OPA_DENY, OPA_UNAVAILABLE,
};
use casf_contracts::request::VerifyRequest;
use casf_contracts::response::{Decision, VerifyResponse};
use casf_policy::PolicyClient;
use casf_rules::SmsLimits;
use casf_store::{ClaimOutcome, IdempotencyStore, RateLimiter};
use serde_json::{json, Value};
use tracing::warn;

use crate::metrics::Metrics;

/// What the transport does with a finished decision (§4.1, §6): a normal
/// decision maps to HTTP 200, the schema-level rejection maps to 400.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Ok(VerifyResponse),
    BadRequest(VerifyResponse),
}

impl VerifyOutcome {
    /// The `VerifyResponse` body, regardless of which status it maps to.
    pub fn response(&self) -> &VerifyResponse {
        match self {
            VerifyOutcome::Ok(r) | VerifyOutcome::BadRequest(r) => r,
        }
    }
}

/// Pipeline-wide settings that are not a trait-object collaborator (§6).
pub struct PipelineConfig {
    pub anti_replay_enabled: bool,
    pub anti_replay_ttl: Duration,
    pub sms_limits: SmsLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            anti_replay_enabled: true,
            anti_replay_ttl: Duration::from_secs(86_400),
            sms_limits: SmsLimits::default(),
        }
    }
}

/// The decision pipeline: one instance serves all concurrent requests (§5).
/// Every field is either immutable after construction or itself safe for
/// concurrent use, so `&DecisionPipeline` needs no external synchronization.
pub struct DecisionPipeline {
    idempotency: Arc<dyn IdempotencyStore>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    policy: Arc<dyn PolicyClient>,
    audit: Arc<dyn AuditStore>,
    metrics: Arc<Metrics>,
    config: PipelineConfig,
}

impl DecisionPipeline {
    pub fn new(
        idempotency: Arc<dyn IdempotencyStore>,
        rate_limiter: Option<Arc<dyn RateLimiter>>,
        policy: Arc<dyn PolicyClient>,
        audit: Arc<dyn AuditStore>,
        metrics: Arc<Metrics>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            idempotency,
            rate_limiter,
            policy,
            audit,
            metrics,
            config,
        }
    }

    /// Decide one `VerifyRequest`, updating metrics around the whole call.
    pub fn verify(&self, request: VerifyRequest) -> VerifyOutcome {
        let start = Instant::now();
        self.metrics.verify_total.inc();
        self.metrics.verify_in_flight.inc();

        let outcome = self.run(&request);

        self.metrics.verify_in_flight.dec();
        self.metrics
            .verify_duration_seconds
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .verify_decision_total
            .with_label_values(&[outcome.response().decision.as_str()])
            .inc();
        outcome
    }

    fn run(&self, request: &VerifyRequest) -> VerifyOutcome {
        // ── Stage A: idempotency / anti-replay gate ─────────────────────
        let mut claimed_fp: Option<String> = None;
        if self.config.anti_replay_enabled {
            let fp = casf_contracts::fingerprint::fingerprint(request);
            match self
                .idempotency
                .check_and_claim(request.request_id, &fp, self.config.anti_replay_ttl)
            {
                Err(err) => {
                    warn!(request_id = %request.request_id, error = %err, "idempotency store unavailable");
                    if request.tool.is_write() {
                        self.metrics.fail_closed_total.with_label_values(&["redis"]).inc();
                        return VerifyOutcome::Ok(VerifyResponse::deny(
                            vec![FAIL_CLOSED.to_string(), INV_REPLAY_CHECK_UNAVAILABLE.to_string()],
                            "idempotency store unavailable (fail-closed on write)",
                        ));
                    }
                    // Fail-open on reads: proceed as if anti-replay were disabled.
                }
                Ok(ClaimOutcome::New) => claimed_fp = Some(fp),
                Ok(ClaimOutcome::Existing { fp: existing_fp, decision }) => {
                    if existing_fp != fp {
                        self.metrics.replay_mismatch_total.inc();
                        return VerifyOutcome::Ok(VerifyResponse::deny(
                            vec![INV_REPLAY_PAYLOAD_MISMATCH.to_string()],
                            "request_id reused with a different request body",
                        ));
                    }
                    match decision {
                        Some(cached) => {
                            self.metrics.replay_hit_total.inc();
                            self.audit_replay_detected(request, &cached);
                            return VerifyOutcome::Ok(cached);
                        }
                        None => {
                            self.metrics.replay_concurrent_total.inc();
                            return VerifyOutcome::Ok(VerifyResponse::deny(
                                vec![INV_REPLAY_CONCURRENT.to_string()],
                                "a request with this request_id is already in flight",
                            ));
                        }
                    }
                }
            }
        }

        // ── Stage B: rules ───────────────────────────────────────────────
        let rule_result = casf_rules::evaluate(request, self.rate_limiter.as_deref(), &self.config.sms_limits);

        if rule_result.decision == Decision::Deny {
            if rule_result.violations == [BAD_REQUEST_MISSING_PATIENT_ID] {
                return VerifyOutcome::BadRequest(rule_result);
            }

            let fail_closed = rule_result.violations.iter().any(|v| v == FAIL_CLOSED);
            if fail_closed {
                self.metrics.fail_closed_total.with_label_values(&["rules"]).inc();
                return self.finish_best_effort(request, rule_result, claimed_fp.as_deref());
            }

            if rule_result.violations.iter().any(|v| v == INV_NO_SMS_BURST) {
                self.metrics.rate_limit_deny_total.inc();
            }
            // A hard rule deny outranks the policy engine (§4.6 rank 7):
            // do not call Stage C, go straight to the normal audit + cache.
            return self.finish(request, rule_result, claimed_fp.as_deref());
        }

        // ── Stage C: policy ──────────────────────────────────────────────
        match self.policy.evaluate(request) {
            Err(err) => {
                self.metrics.opa_error_total.with_label_values(&[err.kind.as_str()]).inc();
                warn!(request_id = %request.request_id, kind = err.kind.as_str(), error = %err, "policy engine call failed");
                if request.tool.is_write() {
                    self.metrics.fail_closed_total.with_label_values(&["opa"]).inc();
                    let response = VerifyResponse::deny(
                        vec![FAIL_CLOSED.to_string(), OPA_UNAVAILABLE.to_string()],
                        "policy engine unavailable (fail-closed on write)",
                    );
                    self.finish(request, response, claimed_fp.as_deref())
                } else {
                    // Read with no verdict: keep the rule engine's preliminary ALLOW.
                    self.finish(request, rule_result, claimed_fp.as_deref())
                }
            }
            Ok(verdict) if !verdict.allow => {
                let violations = if verdict.violations.is_empty() {
                    vec![OPA_DENY.to_string()]
                } else {
                    dedup_in_order(verdict.violations)
                };
                let response = VerifyResponse::deny(violations, "denied by policy engine");
                self.finish(request, response, claimed_fp.as_deref())
            }
            Ok(_allow) => self.finish(request, rule_result, claimed_fp.as_deref()),
        }
    }

    /// Stage D (audit, downgrading the decision on failure) + Stage E
    /// (best-effort decision caching).
    fn finish(
        &self,
        request: &VerifyRequest,
        response: VerifyResponse,
        claimed_fp: Option<&str>,
    ) -> VerifyOutcome {
        let payload = Self::payload(request, &response);
        let actor = request.role.as_actor();

        let final_response = match self.audit.append(
            request.request_id,
            &actor,
            request.tool.as_str(),
            response.decision,
            payload,
        ) {
            Ok(_) => response,
            Err(err) => {
                warn!(request_id = %request.request_id, error = %err, "audit append failed, downgrading decision");
                self.metrics.fail_closed_total.with_label_values(&["audit"]).inc();
                VerifyResponse::deny(
                    vec![FAIL_CLOSED.to_string(), AUDIT_UNAVAILABLE.to_string()],
                    "audit log unavailable",
                )
            }
        };

        self.cache_decision(request, claimed_fp, &final_response);
        VerifyOutcome::Ok(final_response)
    }

    /// Audit best-effort without downgrading on failure — used only for the
    /// rule engine's own `FAIL_CLOSED` (§4.6 Stage B: "audit best-effort and
    /// return the DENY"). The decision is already fail-closed; a failure to
    /// record it does not need a second fail-closed code layered on top.
    fn finish_best_effort(
        &self,
        request: &VerifyRequest,
        response: VerifyResponse,
        claimed_fp: Option<&str>,
    ) -> VerifyOutcome {
        let payload = Self::payload(request, &response);
        let actor = request.role.as_actor();
        if let Err(err) = self.audit.append(
            request.request_id,
            &actor,
            request.tool.as_str(),
            response.decision,
            payload,
        ) {
            warn!(request_id = %request.request_id, error = %err, "best-effort audit append failed");
        }
        self.cache_decision(request, claimed_fp, &response);
        VerifyOutcome::Ok(response)
    }

    fn cache_decision(&self, request: &VerifyRequest, claimed_fp: Option<&str>, response: &VerifyResponse) {
        if let Some(fp) = claimed_fp {
            if let Err(err) = self.idempotency.store_decision(request.request_id, fp, response) {
                warn!(request_id = %request.request_id, error = %err, "failed to cache decision (best effort)");
            }
        }
    }

    /// Best-effort audit of a detected replay — a `REPLAY_DETECTED` row
    /// recording the cached decision being returned again (§4.5). Never
    /// changes the response that goes back to the caller.
    fn audit_replay_detected(&self, request: &VerifyRequest, cached: &VerifyResponse) {
        let payload = Self::payload(request, cached);
        let actor = request.role.as_actor();
        if let Err(err) = self
            .audit
            .append(request.request_id, &actor, REPLAY_DETECTED, cached.decision, payload)
        {
            warn!(request_id = %request.request_id, error = %err, "best-effort replay audit failed");
        }
    }

    fn payload(request: &VerifyRequest, response: &VerifyResponse) -> Value {
        json!({ "request": request, "response": response })
    }
}
