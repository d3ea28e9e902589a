//! Machine binding state machine.
//!
//! Two operations:
//! - [`BindingMachine::activate`] judges an imported artifact and produces
//!   the record to persist. It trusts the signed payload's `machine_id`.
//! - [`BindingMachine::check_startup`] judges the persisted record at launch.
//!   It trusts only the record's local `machine_id`.
//!
//! An unbound payload re-activated on a machine that is not doing a first
//! activation still succeeds and rebinds ([`BindingState::UnboundReactivation`]).

use crate::clock::Clock;
use crate::crypto::verify::SignatureVerifier;
use crate::errors::CorruptReason;
use crate::identity::MachineId;
use crate::policy::key_format::{check_key_format, is_valid_key_format};
use crate::protocol::codec::decode_payload;
use crate::protocol::models::SignedLicenseArtifact;
use crate::store::format::StoredLicenseRecord;
use crate::OfflockError;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Where an activation attempt ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// No license record or artifact.
    NoLicense,
    /// Artifact lacks payload or signature.
    IncompleteArtifact,
    /// Signature failed or payload undecodable.
    Corrupt,
    /// Signed expiry has passed.
    Expired,
    /// Unbound payload bound to this machine for the first time.
    FirstActivation,
    /// Payload bound to this machine.
    BoundMatch,
    /// Payload bound to another machine.
    BoundMismatch,
    /// Unbound payload re-activated outside a first activation; rebinds.
    UnboundReactivation,
}

impl BindingState {
    /// Rejection state for an activation error, if it is one.
    pub fn from_error(err: &OfflockError) -> Option<Self> {
        match err {
            OfflockError::IncompleteArtifact { .. } => Some(Self::IncompleteArtifact),
            OfflockError::Corrupt { .. } => Some(Self::Corrupt),
            OfflockError::Expired { .. } => Some(Self::Expired),
            OfflockError::BoundMismatch { .. } => Some(Self::BoundMismatch),
            _ => None,
        }
    }
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Successful activation.
#[derive(Debug, Clone)]
pub struct Activation {
    /// The success path taken.
    pub state: BindingState,
    /// Record to persist.
    pub record: StoredLicenseRecord,
}

impl Activation {
    /// Take the record to persist.
    pub fn into_record(self) -> StoredLicenseRecord {
        self.record
    }
}

/// Why the startup check refused to run the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Nothing has been activated.
    NoRecord,
    /// The record could not be read.
    Unreadable,
    /// The stored key fails the format pre-filter.
    KeyFormatInvalid,
    /// The stored expiry has passed.
    Expired,
    /// The stored signature no longer verifies.
    SignatureInvalid,
    /// No public key is loaded.
    PublicKeyUnavailable,
}

/// Outcome of the startup check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupVerdict {
    /// The application may run.
    Allowed,
    /// The application may not run; the record stays.
    Denied(DenyReason),
    /// The record is bound to another machine; the host must erase it.
    Revoke,
}

impl StartupVerdict {
    /// Whether the application may run.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The binding state this verdict observed, where one applies.
    pub fn binding_state(&self) -> Option<BindingState> {
        match self {
            Self::Allowed => Some(BindingState::BoundMatch),
            Self::Revoke => Some(BindingState::BoundMismatch),
            Self::Denied(DenyReason::NoRecord) => Some(BindingState::NoLicense),
            Self::Denied(DenyReason::Expired) => Some(BindingState::Expired),
            Self::Denied(DenyReason::Unreadable | DenyReason::SignatureInvalid) => {
                Some(BindingState::Corrupt)
            }
            Self::Denied(DenyReason::KeyFormatInvalid | DenyReason::PublicKeyUnavailable) => None,
        }
    }
}

/// Activation and startup decisions over one verifier and clock.
pub struct BindingMachine {
    verifier: SignatureVerifier,
    clock: Arc<dyn Clock>,
}

impl BindingMachine {
    /// Create a state machine.
    pub fn new(verifier: SignatureVerifier, clock: Arc<dyn Clock>) -> Self {
        Self { verifier, clock }
    }

    /// Judge an imported artifact for the machine `resolved`.
    ///
    /// # Errors
    /// - `IncompleteArtifact` - payload or signature missing
    /// - `PublicKeyUnavailable` - no public key loaded
    /// - `Corrupt` - signature invalid or payload undecodable
    /// - `KeyFormatInvalid` - signed license key fails the format check
    /// - `Expired` - signed expiry has passed
    /// - `BoundMismatch` - payload bound to another machine
    pub fn activate(
        &self,
        artifact: &SignedLicenseArtifact,
        resolved: &MachineId,
        is_first_activation: bool,
    ) -> Result<Activation, OfflockError> {
        let payload_b64 = required(artifact.payload.as_deref(), "payload")?;
        let signature_b64 = required(artifact.signature.as_deref(), "signature")?;

        if let Some(reason) = self.verifier.unavailable_reason() {
            return Err(OfflockError::PublicKeyUnavailable(reason.to_string()));
        }

        if !self.verifier.verify(payload_b64, signature_b64) {
            return Err(OfflockError::corrupt(CorruptReason::SignatureInvalid));
        }

        let payload = decode_payload(payload_b64)?;
        // The stored key is the signed one; it must pass the startup check later.
        check_key_format(&payload.license_key)?;

        if let Some(expired_at) = payload.expire_at.filter(|_| payload.is_expired(&*self.clock)) {
            return Err(OfflockError::Expired { expired_at });
        }

        let state = match payload.bound_machine_id() {
            Some(bound) if resolved.matches(bound) => BindingState::BoundMatch,
            Some(_) => {
                return Err(OfflockError::BoundMismatch {
                    current_machine_id: resolved.to_string(),
                });
            }
            None if is_first_activation => BindingState::FirstActivation,
            None => {
                warn!(
                    machine_id = %resolved,
                    "unbound license re-activated outside first activation, rebinding"
                );
                BindingState::UnboundReactivation
            }
        };

        if resolved.is_unknown() {
            warn!("activating against the sentinel machine id");
        }

        if artifact
            .license_key
            .as_deref()
            .is_some_and(|k| k.trim() != payload.license_key)
        {
            warn!("artifact license_key differs from signed payload, using signed key");
        }

        let record = StoredLicenseRecord::bind(
            payload.license_key,
            resolved,
            payload.expire_at.or(artifact.expire_at),
            payload_b64.to_string(),
            signature_b64.to_string(),
            self.clock.now_utc(),
        );

        info!(state = %state, machine_id = %resolved, "license activated");
        Ok(Activation { state, record })
    }

    /// Judge the persisted record at launch.
    ///
    /// A record bound to another machine yields [`StartupVerdict::Revoke`];
    /// an expired record is denied but kept.
    pub fn check_startup(
        &self,
        stored: Option<&StoredLicenseRecord>,
        resolved: &MachineId,
        reverify_signature: bool,
    ) -> StartupVerdict {
        if !self.verifier.has_key() {
            return StartupVerdict::Denied(DenyReason::PublicKeyUnavailable);
        }

        let Some(record) = stored else {
            return StartupVerdict::Denied(DenyReason::NoRecord);
        };

        if !is_valid_key_format(&record.key) {
            return StartupVerdict::Denied(DenyReason::KeyFormatInvalid);
        }

        if record
            .bound_machine_id()
            .is_some_and(|bound| !resolved.matches(bound))
        {
            return StartupVerdict::Revoke;
        }

        if record.is_expired(&*self.clock) {
            return StartupVerdict::Denied(DenyReason::Expired);
        }

        if reverify_signature && !self.verifier.verify(&record.payload, &record.signature) {
            return StartupVerdict::Denied(DenyReason::SignatureInvalid);
        }

        StartupVerdict::Allowed
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, OfflockError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(OfflockError::IncompleteArtifact { field })
}
