//! Offlock error types.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Why a license artifact was judged corrupt.
///
/// All reasons render the same user-facing message; the distinction exists
/// for callers and logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptReason {
    /// RSA-SHA256 verification of the payload failed.
    SignatureInvalid,
    /// The payload did not decode as base64 -> UTF-8 -> JSON.
    PayloadUndecodable,
    /// The imported license file itself is not a JSON object.
    ArtifactMalformed,
}

impl fmt::Display for CorruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::SignatureInvalid => "signature invalid",
            Self::PayloadUndecodable => "payload undecodable",
            Self::ArtifactMalformed => "artifact malformed",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during license activation and checking.
#[derive(Debug, Error)]
pub enum OfflockError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required field is missing from the imported license file.
    #[error("License file is missing required field `{field}`")]
    IncompleteArtifact {
        /// Name of the missing field.
        field: &'static str,
    },

    /// Signature verification failed or the payload could not be decoded.
    #[error("License file may be corrupted or tampered")]
    Corrupt {
        /// Internal classification, not shown to users.
        reason: CorruptReason,
    },

    /// The signed expiry has passed.
    #[error("License expired at {expired_at}")]
    Expired {
        /// Expiry taken from the signed payload.
        expired_at: DateTime<Utc>,
    },

    /// The license is bound to a different machine.
    #[error("License is already bound to another machine (this machine: {current_machine_id})")]
    BoundMismatch {
        /// Identity of the machine attempting activation.
        current_machine_id: String,
    },

    /// License key does not match the `XXXXX-XXXXX-XXXXX-XXXXX-XXXXX` format.
    #[error("License key format is invalid")]
    KeyFormatInvalid,

    /// The verifier has no public key (packaging defect).
    #[error("License public key unavailable: {0}")]
    PublicKeyUnavailable(String),

    /// License record store I/O error.
    #[error("License store I/O error: {0}")]
    StoreIO(String),

    /// The license file to import could not be read.
    #[error("License file I/O error: {0}")]
    ArtifactIO(String),
}

impl OfflockError {
    /// Whether this is an unexpected fault rather than a license rejection.
    ///
    /// Faults must be treated by the host as "license unverifiable".
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::ConfigError(_) | Self::StoreIO(_) | Self::ArtifactIO(_)
        )
    }

    pub(crate) fn corrupt(reason: CorruptReason) -> Self {
        Self::Corrupt { reason }
    }
}
