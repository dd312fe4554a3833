//! The `READ_ONLY_ALLOWED` degraded-read projection table (§4.3 rule 3).
//!
//! Kept as a process-local constant rather than data-driven from the policy
//! engine — see the clarified open question in the design notes.

use casf_contracts::request::Tool;

/// The output projections a tool is allowed to return under a degraded
/// `READ_ONLY` mode, or `None` if the tool has no degraded projection.
pub fn read_only_allowed(tool: Tool) -> Option<&'static [&'static str]> {
    match tool {
        Tool::ListAppointments => Some(&["slots_aggregated"]),
        _ => None,
    }
}
