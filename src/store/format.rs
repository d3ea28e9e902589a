//! Persisted license record format.
//!
//! The record keeps the signed payload and signature alongside the locally
//! enforced machine binding. `machine_id` here is unsigned: it is the binding
//! the startup check trusts, while activation trusts the signed payload.

use crate::clock::Clock;
use crate::identity::MachineId;
use crate::protocol::timestamp;
use crate::OfflockError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of machines a record may bind. Fixed.
pub const MAX_DEVICES: u32 = 1;

/// Activation mode. Only offline activation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseMode {
    /// Activated from a signed file without a license server.
    Offline,
}

/// The locally persisted, bound license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLicenseRecord {
    /// License key from the signed payload.
    pub key: String,

    /// Machine identity enforced at startup.
    #[serde(default)]
    pub machine_id: Option<String>,

    /// Expiry; `None` means no expiry.
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub expire_at: Option<DateTime<Utc>>,

    /// Base64 payload exactly as imported.
    pub payload: String,

    /// Base64 signature exactly as imported.
    pub signature: String,

    /// Time of the last successful activation.
    pub activated_at: DateTime<Utc>,

    /// Always [`LicenseMode::Offline`].
    pub mode: LicenseMode,

    /// Always [`MAX_DEVICES`].
    pub max_devices: u32,
}

impl StoredLicenseRecord {
    /// Create a record bound to `machine_id`.
    pub fn bind(
        key: String,
        machine_id: &MachineId,
        expire_at: Option<DateTime<Utc>>,
        payload: String,
        signature: String,
        activated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            machine_id: Some(machine_id.as_str().to_string()),
            expire_at,
            payload,
            signature,
            activated_at,
            mode: LicenseMode::Offline,
            max_devices: MAX_DEVICES,
        }
    }

    /// Whether the expiry has passed on `clock`.
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        clock.has_passed(self.expire_at)
    }

    /// Bound machine id, treating blank values as absent.
    pub fn bound_machine_id(&self) -> Option<&str> {
        self.machine_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, OfflockError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OfflockError::StoreIO(format!("Failed to serialize record: {}", e)))
    }

    /// Deserialize a record, enforcing the single-device invariant.
    pub fn from_json(json: &str) -> Result<Self, OfflockError> {
        let record: Self = serde_json::from_str(json)
            .map_err(|e| OfflockError::StoreIO(format!("Failed to deserialize record: {}", e)))?;

        if record.max_devices != MAX_DEVICES {
            return Err(OfflockError::StoreIO(format!(
                "Record allows {} devices, expected {}",
                record.max_devices, MAX_DEVICES
            )));
        }

        Ok(record)
    }
}
