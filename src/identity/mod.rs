//! Machine identity resolution.
//!
//! The identity is a disk (or platform) serial number when one can be read,
//! otherwise the MAC address of the first physical network interface,
//! otherwise the sentinel [`UNKNOWN_MACHINE_ID`]. Every value is normalized
//! with [`normalize`] before comparison.

pub mod disk;
pub mod network;
pub mod probe;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

pub use probe::{CommandProbe, FileProbe, IdentityProbe};

/// Sentinel used when no hardware identifier can be read.
pub const UNKNOWN_MACHINE_ID: &str = "UNKNOWN";

/// Strip every character outside `[A-Za-z0-9]` and uppercase the rest.
///
/// `"AA:BB:CC"`, `"aabbcc"` and `"AA-BB-CC"` all normalize to `"AABBCC"`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// A normalized machine identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(String);

impl MachineId {
    /// Normalize a raw identifier.
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// The sentinel identity.
    pub fn unknown() -> Self {
        Self(UNKNOWN_MACHINE_ID.to_string())
    }

    /// Whether this is the sentinel identity.
    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_MACHINE_ID
    }

    /// Compare against a raw (possibly unnormalized) identifier.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == normalize(raw)
    }

    /// The normalized string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize probe output, dropping values that carry no identity.
fn usable(raw: String) -> Option<String> {
    let normalized = normalize(&raw);
    if normalized.is_empty() || normalized.chars().all(|c| c == '0') {
        None
    } else {
        Some(normalized)
    }
}

/// Ordered, first-success-wins composition of identity probes.
pub struct MachineIdResolver {
    serial_probes: Vec<Box<dyn IdentityProbe>>,
    network_probes: Vec<Box<dyn IdentityProbe>>,
}

impl MachineIdResolver {
    /// Resolver with the probes for the current platform.
    pub fn system() -> Self {
        Self::new(disk::system_probes(), network::system_probes())
    }

    /// Resolver with explicit probe lists.
    pub fn new(
        serial_probes: Vec<Box<dyn IdentityProbe>>,
        network_probes: Vec<Box<dyn IdentityProbe>>,
    ) -> Self {
        Self {
            serial_probes,
            network_probes,
        }
    }

    /// First usable disk or platform serial, normalized.
    pub fn resolve_disk_serial(&self) -> Option<String> {
        first_usable(&self.serial_probes)
    }

    /// First usable MAC address, normalized.
    pub fn resolve_mac_address(&self) -> Option<String> {
        first_usable(&self.network_probes)
    }

    /// Resolve the machine identity. Never fails.
    pub fn resolve(&self) -> MachineId {
        if let Some(serial) = self.resolve_disk_serial() {
            return MachineId(serial);
        }
        if let Some(mac) = self.resolve_mac_address() {
            return MachineId(mac);
        }
        warn!("no hardware identifier available, using sentinel machine id");
        MachineId::unknown()
    }
}

fn first_usable(probes: &[Box<dyn IdentityProbe>]) -> Option<String> {
    probes.iter().find_map(|probe| {
        let value = probe.probe().and_then(usable);
        debug!(probe = probe.name(), found = value.is_some(), "identity probe");
        value
    })
}

/// Resolve the current machine's identity with the platform probes.
pub fn resolve_machine_id() -> MachineId {
    MachineIdResolver::system().resolve()
}
