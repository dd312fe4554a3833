//! Request fingerprinting for the idempotency store (§4.2, GLOSSARY).

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::canonical::canonical_json;
use crate::request::VerifyRequest;

/// SHA-256 hex over the canonical JSON of the request body with
/// `request_id` removed.
pub fn fingerprint(request: &VerifyRequest) -> String {
    let mut value =
        serde_json::to_value(request).expect("VerifyRequest always serializes to JSON");
    if let Value::Object(ref mut map) = value {
        map.remove("request_id");
    }
    let canonical = canonical_json(&value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Context, Mode, Role, Subject, Tool};
    use serde_json::Map;
    use uuid::Uuid;

    fn sample(request_id: Uuid, patient_id: &str) -> VerifyRequest {
        VerifyRequest {
            request_id,
            tool: Tool::ListAppointments,
            mode: Mode::ReadOnly,
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
    fn fingerprint_ignores_request_id() {
        let a = sample(Uuid::new_v4(), "p1");
        let b = sample(Uuid::new_v4(), "p1");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_differs_on_body_change() {
        let id = Uuid::new_v4();
        let a = sample(id, "p1");
        let b = sample(id, "p2");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let req = sample(Uuid::new_v4(), "p1");
        assert_eq!(fingerprint(&req), fingerprint(&req));
    }
}
