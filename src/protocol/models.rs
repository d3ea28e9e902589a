//! License payload and imported artifact structs.

use crate::clock::Clock;
use crate::protocol::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed license terms, as JSON before base64 encoding.
///
/// Fields read here before signature verification are display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Vendor-issued license key.
    #[serde(alias = "licenseKey")]
    pub license_key: String,

    /// Expiry; `None` means the license never expires.
    #[serde(
        default,
        alias = "expireAt",
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire_at: Option<DateTime<Utc>>,

    /// Machine identity embedded by the issuer once the license is bound.
    #[serde(default, alias = "machineId", skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<String>,
}

impl LicensePayload {
    /// Whether the expiry has passed on `clock`.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        clock.has_passed(self.expire_at)
    }

    /// Embedded machine id, treating blank values as absent.
    pub fn bound_machine_id(&self) -> Option<&str> {
        self.machine_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// License file imported by the user (`.lic`).
///
/// Every field is optional on the wire so that a missing field is reported
/// as an incomplete artifact rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLicenseArtifact {
    /// Base64 of the payload JSON bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Base64 RSA-SHA256 signature over the decoded payload bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,

    /// Unsigned copy of the license key, used for format pre-validation.
    #[serde(default, alias = "licenseKey", skip_serializing_if = "Option::is_none")]
    pub license_key: Option<String>,

    /// Unsigned fallback expiry for the stored record when the payload has none.
    #[serde(
        default,
        alias = "expireAt",
        deserialize_with = "timestamp::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub expire_at: Option<DateTime<Utc>>,
}

impl SignedLicenseArtifact {
    /// Build an artifact from its signed parts.
    pub fn new(payload: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            signature: Some(signature.into()),
            ..Self::default()
        }
    }

    /// Set the top-level license key copy.
    pub fn with_license_key(mut self, key: impl Into<String>) -> Self {
        self.license_key = Some(key.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use chrono::TimeZone;

    #[test]
    fn payload_without_optional_fields() {
        let p: LicensePayload =
            serde_json::from_str(r#"{"license_key":"ABCDE-FGHIJ-KLMNO-PQRST-UVWXY"}"#).unwrap();
        assert_eq!(p.expire_at, None);
        assert_eq!(p.bound_machine_id(), None);
    }

    #[test]
    fn payload_camel_case_aliases() {
        let p: LicensePayload = serde_json::from_str(
            r#"{"licenseKey":"K","expireAt":"2030-01-01","machineId":"aa:bb"}"#,
        )
        .unwrap();
        assert_eq!(p.license_key, "K");
        assert_eq!(p.bound_machine_id(), Some("aa:bb"));
        assert!(p.expire_at.is_some());
    }

    #[test]
    fn null_and_empty_expiry_mean_none() {
        let p: LicensePayload =
            serde_json::from_str(r#"{"license_key":"K","expire_at":null}"#).unwrap();
        assert_eq!(p.expire_at, None);
        let p: LicensePayload =
            serde_json::from_str(r#"{"license_key":"K","expire_at":""}"#).unwrap();
        assert_eq!(p.expire_at, None);
    }

    #[test]
    fn invalid_expiry_is_rejected() {
        let r: Result<LicensePayload, _> =
            serde_json::from_str(r#"{"license_key":"K","expire_at":"soon"}"#);
        assert!(r.is_err());
    }

    #[test]
    fn blank_machine_id_is_unbound() {
        let p: LicensePayload =
            serde_json::from_str(r#"{"license_key":"K","machine_id":"  "}"#).unwrap();
        assert_eq!(p.bound_machine_id(), None);
    }

    #[test]
    fn expiry_is_strict() {
        let exp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let p = LicensePayload {
            license_key: "K".into(),
            expire_at: Some(exp),
            machine_id: None,
        };
        let mut clock = MockClock::new(exp);
        assert!(!p.is_expired(&clock));
        clock.advance(chrono::Duration::seconds(1));
        assert!(p.is_expired(&clock));
    }

    #[test]
    fn artifact_missing_fields_still_parses() {
        let a: SignedLicenseArtifact = serde_json::from_str(r#"{"license_key":"K"}"#).unwrap();
        assert_eq!(a.payload, None);
        assert_eq!(a.signature, None);
    }
}
