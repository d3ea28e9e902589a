//! Lenient expiry timestamp parsing.
//!
//! Issuers write `expire_at` in several ISO-8601 shapes. Values without an
//! offset are taken as UTC; a bare date means midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an expiry timestamp.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize an optional expiry. `null`, absent and `""` mean no expiry;
/// any other unparseable value is an error.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_with_offset() {
        let dt = parse_timestamp("2026-03-01T10:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T08:00:00+00:00");
    }

    #[test]
    fn rfc3339_millis_z() {
        let dt = parse_timestamp("2026-03-01T10:00:00.250Z").unwrap();
        assert_eq!(dt.timestamp_millis() % 1000, 250);
    }

    #[test]
    fn naive_datetime_is_utc() {
        let dt = parse_timestamp("2026-03-01T10:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T10:00:00+00:00");
        let dt = parse_timestamp("2026-03-01 10:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }

    #[test]
    fn bare_date_is_midnight() {
        let dt = parse_timestamp("2026-03-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse_timestamp("next tuesday").is_none());
        assert!(parse_timestamp("2026-13-01").is_none());
    }
}
