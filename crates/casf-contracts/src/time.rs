//! UTC timestamp formatting shared by the request/response model and the
//! audit hash contract.

use chrono::{DateTime, Utc};

/// Render `ts` as ISO-8601, UTC, microsecond precision, `Z` suffix.
///
/// This is the canonical textual form used both for `AuditEvent::ts` and for
/// any timestamp embedded in a hashed payload — chrono's own `Serialize`
/// impl emits a `+00:00` offset instead, which is why this crate does not
/// rely on it for anything that ends up inside `canonical_json`.
pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_ts_uses_z_suffix_and_micros() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let rendered = format_ts(&ts);
        assert_eq!(rendered, "2026-01-02T03:04:05.000000Z");
    }
}
