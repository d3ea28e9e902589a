//! # Offlock
//!
//! **Offline, machine-bound license activation for desktop applications.**
//!
//! Offlock decides, with no network access, whether a signed license file
//! entitles the current machine to run the software, and binds a license to
//! exactly one machine so that copying the license record elsewhere does not
//! carry the entitlement with it.
//!
//! ## Features
//!
//! - **RSA-SHA256 verification** of the license payload against a fixed issuer key
//! - **Machine binding** to a disk serial, MAC address fallback, or sentinel
//! - **Self-revocation** of a record found on a machine it was not bound to
//! - **Atomic record writes** so a crash never leaves a half-written record
//! - **Fail-closed** when the issuer public key is missing
//!
//! ## Quickstart
//!
//! ```no_run
//! use offlock::{LicenseGate, OfflockConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), offlock::OfflockError> {
//!     let config = OfflockConfig::new("my-pos", "/opt/my-pos/license_public.pem");
//!     let gate = LicenseGate::new(config)?;
//!
//!     if !gate.check_startup() {
//!         let record = gate.activate_file(Path::new("customer.lic"))?;
//!         println!("Activated {} on {}", record.key, gate.machine_id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Binding model
//!
//! Two binding records exist and are deliberately kept apart:
//! - the signed payload's `machine_id`, set by the issuer, trusted by activation;
//! - the local record's `machine_id`, unsigned, trusted by the startup check.
//!
//! Both checks use the same machine identity resolver.
//!
//! ## Threat Model
//!
//! Offlock prevents moving a license to another machine by copying files and
//! detects tampering with the signed payload. It does **not** prevent binary
//! patching, and the local record's binding is only as strong as the file
//! system permissions protecting it.

#![warn(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Machine identity
pub mod identity;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Persistence
pub mod store;

// Policy layer
pub mod policy;

// Gate (main public API)
pub mod gate;

#[cfg(test)]
mod test_support;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::OfflockConfig;
pub use crypto::key::LicensePublicKey;
pub use crypto::verify::SignatureVerifier;
pub use errors::{CorruptReason, OfflockError};
pub use gate::{LicenseGate, LicenseStatus};
pub use identity::{normalize, resolve_machine_id, MachineId, MachineIdResolver};
pub use policy::binding::{BindingMachine, BindingState, DenyReason, StartupVerdict};
pub use policy::key_format::is_valid_key_format;
pub use protocol::codec::{decode_payload, parse_artifact};
pub use protocol::models::{LicensePayload, SignedLicenseArtifact};
pub use store::file::FileRecordStore;
pub use store::format::{LicenseMode, StoredLicenseRecord};
pub use store::RecordStore;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
