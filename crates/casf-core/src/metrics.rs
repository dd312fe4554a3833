//! Process-local metrics (§5, §6).
//!
//! The wire format served on `/metrics` is an external collaborator (§1) —
//! this module only owns the counters, gauges, and histograms themselves.
//! `prometheus`'s primitives already serialize updates internally, which is
//! the "updated under a small lock" requirement of §5; a caller wiring up
//! the HTTP exposition endpoint reads `Metrics::registry()` and renders it
//! with `prometheus::TextEncoder`, outside this crate's concern.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

/// The named counters, gauges, and histograms of §6, held together so the
/// pipeline can take a single `&Metrics` reference.
pub struct Metrics {
    registry: Registry,
    pub verify_total: IntCounter,
    pub verify_decision_total: IntCounterVec,
    pub verify_in_flight: IntGauge,
    pub verify_duration_seconds: Histogram,
    pub replay_hit_total: IntCounter,
    pub replay_mismatch_total: IntCounter,
    pub replay_concurrent_total: IntCounter,
    pub fail_closed_total: IntCounterVec,
    pub rate_limit_deny_total: IntCounter,
    pub opa_error_total: IntCounterVec,
}

impl Metrics {
    /// Build a fresh registry and register every metric named in §6.
    pub fn new() -> Self {
        let registry = Registry::new();

        let verify_total = IntCounter::new("casf_verify_total", "total Verify requests handled")
            .expect("static metric definition");
        let verify_decision_total = IntCounterVec::new(
            Opts::new("casf_verify_decision_total", "Verify requests by final decision"),
            &["decision"],
        )
        .expect("static metric definition");
        let verify_in_flight = IntGauge::new("casf_verify_in_flight", "Verify requests currently being decided")
            .expect("static metric definition");
        let verify_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("casf_verify_duration_seconds", "Verify pipeline latency in seconds")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        )
        .expect("static metric definition");
        let replay_hit_total = IntCounter::new("casf_replay_hit_total", "cached-decision replays returned")
            .expect("static metric definition");
        let replay_mismatch_total = IntCounter::new(
            "casf_replay_mismatch_total",
            "replays rejected for a fingerprint mismatch",
        )
        .expect("static metric definition");
        let replay_concurrent_total = IntCounter::new(
            "casf_replay_concurrent_total",
            "replays rejected because the original request is still in flight",
        )
        .expect("static metric definition");
        let fail_closed_total = IntCounterVec::new(
            Opts::new("casf_fail_closed_total", "fail-closed denials by triggering gate"),
            &["trigger"],
        )
        .expect("static metric definition");
        let rate_limit_deny_total = IntCounter::new("casf_rate_limit_deny_total", "SMS burst limit denials")
            .expect("static metric definition");
        let opa_error_total = IntCounterVec::new(
            Opts::new("casf_opa_error_total", "policy engine call errors by kind"),
            &["kind"],
        )
        .expect("static metric definition");

        for collector in [
            Box::new(verify_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(verify_decision_total.clone()),
            Box::new(verify_in_flight.clone()),
            Box::new(verify_duration_seconds.clone()),
            Box::new(replay_hit_total.clone()),
            Box::new(replay_mismatch_total.clone()),
            Box::new(replay_concurrent_total.clone()),
            Box::new(fail_closed_total.clone()),
            Box::new(rate_limit_deny_total.clone()),
            Box::new(opa_error_total.clone()),
        ] {
            registry.register(collector).expect("metric names are unique and static");
        }

        Self {
            registry,
            verify_total,
            verify_decision_total,
            verify_in_flight,
            verify_duration_seconds,
            replay_hit_total,
            replay_mismatch_total,
            replay_concurrent_total,
            fail_closed_total,
            rate_limit_deny_total,
            opa_error_total,
        }
    }

    /// The registry backing these collectors, for a caller rendering
    /// `/metrics` with `prometheus::TextEncoder`.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_without_panicking() {
        let metrics = Metrics::new();
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn counters_start_at_zero() {
        let metrics = Metrics::new();
        assert_eq!(metrics.verify_total.get(), 0);
        assert_eq!(metrics.verify_in_flight.get(), 0);
    }

    #[test]
    fn labeled_counters_increment_independently() {
        let metrics = Metrics::new();
        metrics.fail_closed_total.with_label_values(&["redis"]).inc();
        metrics.fail_closed_total.with_label_values(&["opa"]).inc();
        metrics.fail_closed_total.with_label_values(&["opa"]).inc();
        assert_eq!(metrics.fail_closed_total.with_label_values(&["redis"]).get(), 1);
        assert_eq!(metrics.fail_closed_total.with_label_values(&["opa"]).get(), 2);
    }
}
