//! Canonical JSON encoding used for hashing and fingerprinting.
//!
//! Canonicalization sorts object keys, emits no extraneous whitespace, and
//! normalizes the `+00:00` UTC offset chrono's `Serialize` impl emits into
//! the `Z` suffix the hash contract (§3) requires. `serde_json::Value::Object`
//! is backed by a `BTreeMap` in this workspace (the `preserve_order` feature
//! is never enabled), so compact serialization alone already yields
//! sorted keys — the only transformation left to do by hand is the
//! timestamp suffix.

use serde_json::Value;

/// Serialize `value` as compact, key-sorted JSON with `+00:00` suffixes on
/// string fields normalized to `Z`.
pub fn canonical_json(value: &Value) -> String {
    let normalized = normalize_timestamps(value.clone());
    serde_json::to_string(&normalized).expect("a serde_json::Value always serializes")
}

fn normalize_timestamps(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(normalize_offset(&s)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(normalize_timestamps).collect())
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, normalize_timestamps(v)))
                .collect(),
        ),
        other => other,
    }
}

fn normalize_offset(s: &str) -> String {
    match s.strip_suffix("+00:00") {
        Some(prefix) => format!("{prefix}Z"),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys() {
        let value = json!({"b": 1, "a": 2});
        assert_eq!(canonical_json(&value), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn sorts_nested_object_keys() {
        let value = json!({"z": {"b": 1, "a": 2}});
        assert_eq!(canonical_json(&value), r#"{"z":{"a":2,"b":1}}"#);
    }

    #[test]
    fn normalizes_offset_suffix() {
        let value = json!({"ts": "2026-01-02T03:04:05+00:00"});
        assert_eq!(canonical_json(&value), r#"{"ts":"2026-01-02T03:04:05Z"}"#);
    }

    #[test]
    fn leaves_non_offset_strings_alone() {
        let value = json!({"ts": "2026-01-02T03:04:05Z", "s": "+00:00 not a timestamp tail"});
        let out = canonical_json(&value);
        assert!(out.contains(r#""ts":"2026-01-02T03:04:05Z""#));
        assert!(out.contains("not a timestamp tail"));
    }

    #[test]
    fn is_deterministic_across_insertion_order() {
        let a = json!({"a": 1, "b": 2});
        let b = json!({"b": 2, "a": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }
}
