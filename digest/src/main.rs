//! Anchor-ready daily digest of the CASF audit hash-chain (§4.5).
//!
//! Reads a JSON export of `AuditEvent`s (in ascending durable-id order),
//! narrows to one UTC date window, and prints the signed digest that
//! `casf_audit::build_digest` computes for it, with a `generated_at`
//! timestamp stamped on at print time.
//!
//! Usage:
//!   digest events.json
//!   digest events.json --date 2026-07-27
//!
//! Exit codes: 0 chain valid, 1 chain broken (digest still emitted),
//! 2 the export could not be read or parsed.

use std::path::PathBuf;

use casf_audit::build_digest;
use casf_contracts::audit::AuditEvent;
use casf_contracts::time::format_ts;
use chrono::{Duration, Utc};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "digest",
    about = "Emit a signed daily digest of the CASF audit hash-chain",
    long_about = "Reads a JSON export of audit events, verifies hash-chain linkage within\n\
                  one UTC date window, and prints a signed digest to stdout. Intended to\n\
                  run once a day against a freshly exported audit table; the output is\n\
                  meant for WORM storage, a SIEM, or a detached GPG signature."
)]
struct Cli {
    /// Path to a JSON array of audit events, in ascending durable-id order.
    events_path: PathBuf,

    /// Date window to digest, `YYYY-MM-DD` (UTC). Defaults to yesterday.
    #[arg(long)]
    date: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    std::process::exit(run(Cli::parse()));
}

fn run(cli: Cli) -> i32 {
    let window = cli.date.unwrap_or_else(default_window);

    let raw = match std::fs::read_to_string(&cli.events_path) {
        Ok(raw) => raw,
        Err(e) => return fail(&format!("could not read {}: {e}", cli.events_path.display())),
    };
    let events: Vec<AuditEvent> = match serde_json::from_str(&raw) {
        Ok(events) => events,
        Err(e) => return fail(&format!("could not parse audit event export: {e}")),
    };

    let window_events: Vec<AuditEvent> = events
        .into_iter()
        .filter(|e| e.ts.format("%Y-%m-%d").to_string() == window)
        .collect();

    let report = build_digest(&window, &window_events);
    let chain_valid = report.chain_valid;

    let output = json!({
        "generated_at": format_ts(&Utc::now()),
        "window": report.window,
        "event_count": report.event_count,
        "first_hash": report.first_hash,
        "last_hash": report.last_hash,
        "chain_valid": report.chain_valid,
        "digest_hash": report.digest_hash,
    });
    println!("{}", serde_json::to_string_pretty(&output).expect("a digest value always serializes"));

    if chain_valid {
        0
    } else {
        1
    }
}

fn default_window() -> String {
    (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string()
}

fn fail(reason: &str) -> i32 {
    eprintln!("{}", json!({ "error": reason }));
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_yesterday_not_today() {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        assert_ne!(default_window(), today);
    }

    #[test]
    fn fail_returns_exit_code_two() {
        assert_eq!(fail("boom"), 2);
    }
}
