//! Issuer public key loading.

use crate::OfflockError;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::VerifyingKey;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;
use tracing::debug;

const PKCS1_PEM_LABEL: &str = "BEGIN RSA PUBLIC KEY";

/// The issuer's RSA public key, ready for PKCS#1 v1.5 / SHA-256 verification.
///
/// Immutable once constructed.
#[derive(Clone)]
pub struct LicensePublicKey {
    verifying_key: VerifyingKey<Sha256>,
    fingerprint: String,
}

impl LicensePublicKey {
    /// Parse a PEM public key, SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
    pub fn from_pem(pem: &str) -> Result<Self, OfflockError> {
        let public_key = if pem.contains(PKCS1_PEM_LABEL) {
            RsaPublicKey::from_pkcs1_pem(pem.trim()).map_err(|e| {
                OfflockError::PublicKeyUnavailable(format!("Invalid PKCS#1 public key: {}", e))
            })?
        } else {
            RsaPublicKey::from_public_key_pem(pem.trim()).map_err(|e| {
                OfflockError::PublicKeyUnavailable(format!("Invalid SPKI public key: {}", e))
            })?
        };

        let der = public_key.to_public_key_der().map_err(|e| {
            OfflockError::PublicKeyUnavailable(format!("Cannot encode public key: {}", e))
        })?;
        let fingerprint = hex::encode(Sha256::digest(der.as_bytes()));

        Ok(Self {
            verifying_key: VerifyingKey::<Sha256>::new(public_key),
            fingerprint,
        })
    }

    /// Read and parse a PEM public key file.
    pub fn from_pem_file(path: &Path) -> Result<Self, OfflockError> {
        let pem = std::fs::read_to_string(path).map_err(|e| {
            OfflockError::PublicKeyUnavailable(format!(
                "Cannot read {}: {}",
                path.display(),
                e
            ))
        })?;
        let key = Self::from_pem(&pem)?;
        debug!(path = %path.display(), fingerprint = %key.fingerprint, "loaded license public key");
        Ok(key)
    }

    /// Hex SHA-256 of the DER-encoded SPKI.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey<Sha256> {
        &self.verifying_key
    }
}

impl fmt::Debug for LicensePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LicensePublicKey")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}
