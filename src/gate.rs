//! License Gate - the main public API for Offlock.
//!
//! The `LicenseGate` is what the host application talks to:
//! - `check_startup` at launch decides whether the application may run
//! - `activate` / `activate_file` bind an imported license to this machine
//!
//! Store faults never escape `check_startup`; they count as "no valid license".

use crate::clock::{Clock, SystemClock};
use crate::config::OfflockConfig;
use crate::crypto::verify::SignatureVerifier;
use crate::identity::{MachineId, MachineIdResolver};
use crate::policy::binding::{BindingMachine, BindingState, DenyReason, StartupVerdict};
use crate::policy::key_format::check_key_format;
use crate::protocol::codec::parse_artifact;
use crate::protocol::models::SignedLicenseArtifact;
use crate::store::file::FileRecordStore;
use crate::store::format::StoredLicenseRecord;
use crate::store::RecordStore;
use crate::OfflockError;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Display view of the persisted license.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseStatus {
    /// License key.
    pub key: String,
    /// Machine the record is bound to.
    pub machine_id: Option<String>,
    /// Expiry, if any.
    pub expire_at: Option<DateTime<Utc>>,
    /// Last successful activation.
    pub activated_at: DateTime<Utc>,
    /// Whole days until expiry, floored at zero. `None` without expiry.
    pub days_remaining: Option<i64>,
    /// Whether the startup check would currently pass.
    pub valid: bool,
}

/// Host-side entry point for offline licensing.
///
/// Create one per process; the machine identity is resolved once and reused.
pub struct LicenseGate {
    config: OfflockConfig,
    binding: BindingMachine,
    store: Box<dyn RecordStore>,
    resolver: MachineIdResolver,
    machine_id: OnceCell<MachineId>,
    clock: Arc<dyn Clock>,
}

impl LicenseGate {
    /// Create a gate from configuration, with the file store, system probes
    /// and system clock.
    ///
    /// A missing or unreadable public key does not fail construction; every
    /// check then fails closed.
    ///
    /// # Errors
    /// - `ConfigError` - configuration validation fails
    /// - `StoreIO` - record directory cannot be located or created
    pub fn new(config: OfflockConfig) -> Result<Self, OfflockError> {
        config.validate()?;
        let verifier = SignatureVerifier::load(&config.public_key_path);
        let store = FileRecordStore::new(config.record_path()?)?;
        Ok(Self::with_parts(
            config,
            verifier,
            Box::new(store),
            MachineIdResolver::system(),
            Arc::new(SystemClock),
        ))
    }

    /// Create a gate from explicit collaborators.
    pub fn with_parts(
        config: OfflockConfig,
        verifier: SignatureVerifier,
        store: Box<dyn RecordStore>,
        resolver: MachineIdResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            binding: BindingMachine::new(verifier, clock.clone()),
            config,
            store,
            resolver,
            machine_id: OnceCell::new(),
            clock,
        }
    }

    /// This machine's identity.
    pub fn machine_id(&self) -> &MachineId {
        self.machine_id.get_or_init(|| self.resolver.resolve())
    }

    /// Judge the persisted record, erasing it if it belongs to another machine.
    pub fn startup_verdict(&self) -> StartupVerdict {
        let record = match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "license record unreadable, treating as unlicensed");
                return StartupVerdict::Denied(DenyReason::Unreadable);
            }
        };

        let verdict = self.binding.check_startup(
            record.as_ref(),
            self.machine_id(),
            self.config.reverify_on_startup,
        );

        match verdict {
            StartupVerdict::Allowed => info!("license check passed"),
            StartupVerdict::Denied(reason) => {
                info!(?reason, state = ?verdict.binding_state(), "license check failed")
            }
            StartupVerdict::Revoke => {
                warn!(
                    machine_id = %self.machine_id(),
                    "license bound to another machine, erasing local record"
                );
                if let Err(e) = self.store.delete() {
                    error!(error = %e, "failed to erase license record");
                }
            }
        }

        verdict
    }

    /// Whether the application may run.
    pub fn check_startup(&self) -> bool {
        self.startup_verdict().is_allowed()
    }

    /// Activate an imported artifact on this machine and persist the result.
    ///
    /// # Errors
    /// - `IncompleteArtifact` - license key, payload or signature missing
    /// - `KeyFormatInvalid` - license key fails the format pre-filter
    /// - `PublicKeyUnavailable` - no public key loaded
    /// - `Corrupt` - signature invalid or payload undecodable
    /// - `Expired` - signed expiry has passed
    /// - `BoundMismatch` - license bound to another machine
    /// - `StoreIO` - the record could not be saved
    pub fn activate(
        &self,
        artifact: &SignedLicenseArtifact,
    ) -> Result<StoredLicenseRecord, OfflockError> {
        let key = artifact
            .license_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(OfflockError::IncompleteArtifact {
                field: "license_key",
            })?;
        check_key_format(key)?;

        let is_first_activation = self
            .load_record()
            .map_or(true, |r| r.bound_machine_id().is_none());

        let activation = self
            .binding
            .activate(artifact, self.machine_id(), is_first_activation)
            .map_err(|e| {
                match BindingState::from_error(&e) {
                    Some(state) => warn!(%state, error = %e, "license activation rejected"),
                    None => error!(error = %e, "license activation failed"),
                }
                e
            })?;

        self.store.save(&activation.record)?;
        Ok(activation.into_record())
    }

    /// Read a `.lic` file and activate it.
    ///
    /// # Errors
    /// As [`LicenseGate::activate`], plus `ArtifactIO` when the file cannot be
    /// read and `Corrupt` when it is not a JSON artifact.
    pub fn activate_file(&self, path: &Path) -> Result<StoredLicenseRecord, OfflockError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            OfflockError::ArtifactIO(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let artifact = parse_artifact(&json)?;
        self.activate(&artifact)
    }

    /// Current license for display, without side effects.
    pub fn status(&self) -> Option<LicenseStatus> {
        let record = self.load_record()?;
        let verdict = self.binding.check_startup(
            Some(&record),
            self.machine_id(),
            self.config.reverify_on_startup,
        );
        Some(LicenseStatus {
            days_remaining: record.expire_at.map(|exp| self.clock.days_until(exp)),
            valid: verdict.is_allowed(),
            key: record.key,
            machine_id: record.machine_id,
            expire_at: record.expire_at,
            activated_at: record.activated_at,
        })
    }

    /// Erase the persisted license.
    pub fn deactivate(&self) -> Result<(), OfflockError> {
        self.store.delete()?;
        info!("license deactivated");
        Ok(())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &OfflockConfig {
        &self.config
    }

    fn load_record(&self) -> Option<StoredLicenseRecord> {
        match self.store.load() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "license record unreadable");
                None
            }
        }
    }
}
