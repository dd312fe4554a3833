//! The validated `VerifyRequest` envelope and its closed enumerations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The six tools the gateway knows how to gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[serde(rename = "cliniccloud.create_appointment")]
    CreateAppointment,
    #[serde(rename = "cliniccloud.cancel_appointment")]
    CancelAppointment,
    #[serde(rename = "cliniccloud.list_appointments")]
    ListAppointments,
    #[serde(rename = "cliniccloud.summary_history")]
    SummaryHistory,
    #[serde(rename = "twilio.send_sms")]
    SendSms,
    #[serde(rename = "stripe.generate_invoice")]
    GenerateInvoice,
}

impl Tool {
    /// The wire string for this tool, e.g. `"twilio.send_sms"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::CreateAppointment => "cliniccloud.create_appointment",
            Tool::CancelAppointment => "cliniccloud.cancel_appointment",
            Tool::ListAppointments => "cliniccloud.list_appointments",
            Tool::SummaryHistory => "cliniccloud.summary_history",
            Tool::SendSms => "twilio.send_sms",
            Tool::GenerateInvoice => "stripe.generate_invoice",
        }
    }

    /// `true` for the fixed `WriteTools` set (§3); `false` for reads.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Tool::CreateAppointment
                | Tool::CancelAppointment
                | Tool::SendSms
                | Tool::GenerateInvoice
        )
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operating mode asserted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "ALLOW")]
    Allow,
    #[serde(rename = "STEP_UP")]
    StepUp,
    #[serde(rename = "READ_ONLY")]
    ReadOnly,
    #[serde(rename = "KILL_SWITCH")]
    KillSwitch,
}

/// The caller's asserted role. Trusted up to what the policy engine permits
/// (§1 Non-goals) — this gateway does not authenticate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Receptionist,
    Nurse,
    Doctor,
    Billing,
    Custodian,
    System,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::Receptionist => "receptionist",
            Role::Nurse => "nurse",
            Role::Doctor => "doctor",
            Role::Billing => "billing",
            Role::Custodian => "custodian",
            Role::System => "system",
        }
    }

    /// `"role:" + role`, the `AuditEvent::actor` convention (§3).
    pub fn as_actor(&self) -> String {
        format!("role:{}", self.as_str())
    }
}

/// The patient the action concerns, plus whatever free-form fields the
/// caller attached. Unknown keys are preserved verbatim for the audit
/// payload (§9 Design Notes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub patient_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subject {
    /// `false` when `patient_id` is empty — the boundary check of §4.1.
    pub fn has_patient_id(&self) -> bool {
        !self.patient_id.trim().is_empty()
    }
}

/// Request context: the caller's tenant plus optional provenance fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub tenant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Context {
    pub fn has_tenant_id(&self) -> bool {
        !self.tenant_id.trim().is_empty()
    }
}

/// The validated envelope a caller submits to `Verify` (§2, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Idempotency key. Distinct requests must use distinct ids.
    pub request_id: Uuid,
    pub tool: Tool,
    pub mode: Mode,
    pub role: Role,
    pub subject: Subject,
    #[serde(default)]
    pub args: Map<String, Value>,
    pub context: Context,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_round_trips_through_wire_names() {
        let json = serde_json::to_string(&Tool::SendSms).unwrap();
        assert_eq!(json, r#""twilio.send_sms""#);
        let back: Tool = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Tool::SendSms);
    }

    #[test]
    fn write_tools_matches_the_fixed_set() {
        assert!(Tool::CreateAppointment.is_write());
        assert!(Tool::CancelAppointment.is_write());
        assert!(Tool::SendSms.is_write());
        assert!(Tool::GenerateInvoice.is_write());
        assert!(!Tool::ListAppointments.is_write());
        assert!(!Tool::SummaryHistory.is_write());
    }

    #[test]
    fn mode_wire_names() {
        assert_eq!(serde_json::to_string(&Mode::ReadOnly).unwrap(), r#""READ_ONLY""#);
        assert_eq!(
            serde_json::to_string(&Mode::KillSwitch).unwrap(),
            r#""KILL_SWITCH""#
        );
    }

    #[test]
    fn role_actor_string() {
        assert_eq!(Role::Nurse.as_actor(), "role:nurse");
    }

    #[test]
    fn subject_preserves_unknown_fields() {
        let json = serde_json::json!({"patient_id": "p1", "mrn": "123"});
        let subject: Subject = serde_json::from_value(json).unwrap();
        assert!(subject.has_patient_id());
        assert_eq!(subject.extra.get("mrn").unwrap(), "123");
    }

    #[test]
    fn subject_empty_patient_id_fails_boundary_check() {
        let subject = Subject {
            patient_id: "   ".to_string(),
            extra: Map::new(),
        };
        assert!(!subject.has_patient_id());
    }

    #[test]
    fn context_requires_tenant_id() {
        let context = Context {
            tenant_id: String::new(),
            timestamp: None,
            source: None,
            session_id: None,
            ip: None,
            extra: Map::new(),
        };
        assert!(!context.has_tenant_id());
    }

    #[test]
    fn verify_request_round_trips() {
        let raw = serde_json::json!({
            "request_id": "550e8400-e29b-41d4-a716-446655440000",
            "tool": "cliniccloud.list_appointments",
            "mode": "READ_ONLY",
            "role": "receptionist",
            "subject": {"patient_id": "p1"},
            "args": {},
            "context": {"tenant_id": "t1"}
        });
        let req: VerifyRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(req.tool, Tool::ListAppointments);
        assert_eq!(req.mode, Mode::ReadOnly);
        assert_eq!(req.role, Role::Receptionist);
    }
}
