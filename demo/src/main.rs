//! CASF Verification Gateway — Demo CLI
//!
//! Runs one or all of the concrete scenarios from the gateway's testable
//! properties, wiring a real `DecisionPipeline` up to in-memory reference
//! collaborators (no network, no database — see `casf-store`/`casf-audit`'s
//! `InMemory*` types).
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- degraded-read
//!   cargo run -p demo -- safe-mode-write-ban
//!   cargo run -p demo -- sms-burst
//!   cargo run -p demo -- replay-cached
//!   cargo run -p demo -- replay-mismatch
//!   cargo run -p demo -- audit-chain-tamper

use std::sync::Arc;

use casf_audit::memory::InMemoryAuditStore;
use casf_audit::traits::AuditStore;
use casf_contracts::error::CasfResult;
use casf_contracts::request::{Context, Mode, Role, Subject, Tool, VerifyRequest};
use casf_contracts::response::Decision;
use casf_core::{DecisionPipeline, Metrics, PipelineConfig, VerifyOutcome};
use casf_policy::MockPolicyClient;
use casf_store::{InMemoryIdempotencyStore, InMemoryRateLimiter};
use clap::{Parser, Subcommand};
use serde_json::Map;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "demo",
    about = "CASF verification gateway demo",
    long_about = "Runs the gateway's decision pipeline against the concrete scenarios\n\
                  from its testable-properties section, showing each stage's verdict.\n\n\
                  Scenarios:\n\
                  1. Degraded read allow   — READ_ONLY mode narrows a list call's output\n\
                  2. Safe-mode write ban   — a write tool is refused outside ALLOW mode\n\
                  3. SMS burst             — a second send within the window is denied\n\
                  4. Replay cached         — a repeated request returns its stored decision\n\
                  5. Replay mismatch       — a reused request_id with a new body is denied\n\
                  6. Audit chain tamper    — a single flipped hash byte breaks verification"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all six scenarios in sequence.
    RunAll,
    DegradedRead,
    SafeModeWriteBan,
    SmsBurst,
    ReplayCached,
    ReplayMismatch,
    AuditChainTamper,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    print_banner();

    let result = match cli.command {
        Command::RunAll => run_all(),
        Command::DegradedRead => scenario_degraded_read(),
        Command::SafeModeWriteBan => scenario_safe_mode_write_ban(),
        Command::SmsBurst => scenario_sms_burst(),
        Command::ReplayCached => scenario_replay_cached(),
        Command::ReplayMismatch => scenario_replay_mismatch(),
        Command::AuditChainTamper => scenario_audit_chain_tamper(),
    };

    match result {
        Ok(()) => println!("All selected scenarios completed successfully."),
        Err(e) => {
            eprintln!("Demo error: {e}");
            std::process::exit(1);
        }
    }
}

fn run_all() -> CasfResult<()> {
    scenario_degraded_read()?;
    scenario_safe_mode_write_ban()?;
    scenario_sms_burst()?;
    scenario_replay_cached()?;
    scenario_replay_mismatch()?;
    scenario_audit_chain_tamper()?;
    Ok(())
}

fn print_banner() {
    println!();
    println!("CASF — Clinical Action Safety Framework");
    println!("Verification Gateway Demo");
    println!("========================================");
    println!();
    println!("Decision pipeline per Verify call:");
    println!("  [A] Idempotency gate    — claim request_id, detect replays");
    println!("  [B] Rule engine         — traceability, safe-mode, degraded reads, SMS burst");
    println!("  [C] Policy client       — external allow/deny verdict");
    println!("  [D] Audit log           — hash-chained, tamper-evident append");
    println!("  [E] Decision cache      — best-effort, for replay hits");
    println!();
}

// ── Scenario plumbing ───────────────────────────────────────────────────────

fn pipeline() -> DecisionPipeline {
    DecisionPipeline::new(
        Arc::new(InMemoryIdempotencyStore::new()),
        Some(Arc::new(InMemoryRateLimiter::new())),
        Arc::new(MockPolicyClient::allow()),
        Arc::new(InMemoryAuditStore::new()),
        Arc::new(Metrics::new()),
        PipelineConfig::default(),
    )
}

fn request(tool: Tool, mode: Mode, patient_id: &str, tenant_id: &str) -> VerifyRequest {
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
            tenant_id: tenant_id.to_string(),
            timestamp: None,
            source: None,
            session_id: None,
            ip: None,
            extra: Map::new(),
        },
    }
}

fn print_outcome(label: &str, outcome: &VerifyOutcome) {
    let status = match outcome {
        VerifyOutcome::Ok(_) => "200",
        VerifyOutcome::BadRequest(_) => "400",
    };
    let response = outcome.response();
    println!(
        "  {label}: HTTP {status} decision={} violations={:?} reason={:?}",
        response.decision, response.violations, response.reason
    );
}

// ── Scenarios (§8) ──────────────────────────────────────────────────────────

fn scenario_degraded_read() -> CasfResult<()> {
    println!("Scenario 1: Degraded read allow");
    let pipeline = pipeline();
    let req = request(Tool::ListAppointments, Mode::ReadOnly, "p1", "t");
    let outcome = pipeline.verify(req);
    print_outcome("list_appointments (READ_ONLY)", &outcome);
    println!();
    Ok(())
}

fn scenario_safe_mode_write_ban() -> CasfResult<()> {
    println!("Scenario 2: Safe-mode write ban");
    let pipeline = pipeline();
    let req = request(Tool::CreateAppointment, Mode::ReadOnly, "p1", "t");
    let outcome = pipeline.verify(req);
    print_outcome("create_appointment (READ_ONLY)", &outcome);
    println!();
    Ok(())
}

fn scenario_sms_burst() -> CasfResult<()> {
    println!("Scenario 3: SMS burst");
    let pipeline = pipeline();
    let first = request(Tool::SendSms, Mode::Allow, "p1", "t");
    let second = request(Tool::SendSms, Mode::Allow, "p1", "t");
    print_outcome("first send_sms ", &pipeline.verify(first));
    print_outcome("second send_sms", &pipeline.verify(second));
    println!();
    Ok(())
}

fn scenario_replay_cached() -> CasfResult<()> {
    println!("Scenario 4: Replay cached");
    let pipeline = pipeline();
    let req = request(Tool::ListAppointments, Mode::ReadOnly, "p1", "t");
    print_outcome("first call ", &pipeline.verify(req.clone()));
    print_outcome("replayed call", &pipeline.verify(req));
    println!();
    Ok(())
}

fn scenario_replay_mismatch() -> CasfResult<()> {
    println!("Scenario 5: Replay mismatch");
    let pipeline = pipeline();
    let mut req = request(Tool::ListAppointments, Mode::ReadOnly, "p1", "t");
    print_outcome("first call          ", &pipeline.verify(req.clone()));
    req.subject.patient_id = "p2".to_string();
    print_outcome("reused id, new body", &pipeline.verify(req));
    println!();
    Ok(())
}

fn scenario_audit_chain_tamper() -> CasfResult<()> {
    println!("Scenario 6: Audit chain tamper");
    let store = InMemoryAuditStore::new();
    store.append(Uuid::new_v4(), "role:nurse", "a", Decision::Allow, serde_json::json!({"n": 0}))?;
    let mut middle = store.append(Uuid::new_v4(), "role:nurse", "b", Decision::Allow, serde_json::json!({"n": 1}))?;
    store.append(Uuid::new_v4(), "role:nurse", "c", Decision::Allow, serde_json::json!({"n": 2}))?;

    let (ok_before, _) = casf_audit::verify_chain(&store.all_events()?);
    println!("  chain before tamper: valid={ok_before}");

    let mut events = store.all_events()?;
    middle.hash = "f".repeat(64);
    events[1] = middle;
    let (ok_after, bad_index) = casf_audit::verify_chain(&events);
    println!("  chain after flipping event[1].hash: valid={ok_after} first_bad_index={bad_index:?}");
    println!();
    Ok(())
}
