//! RSA-SHA256 signature verification.
//!
//! The signed message is the base64-decoded payload bytes, never the base64
//! text. Every failure, including a missing public key, yields `false`.

use crate::crypto::key::LicensePublicKey;
use crate::protocol::codec::decode_base64;
use rsa::pkcs1v15::Signature;
use rsa::signature::Verifier;
use std::path::Path;
use tracing::{debug, error};

/// Verifies license signatures against one immutable public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: Result<LicensePublicKey, String>,
}

impl SignatureVerifier {
    /// Verifier backed by `key`.
    pub fn new(key: LicensePublicKey) -> Self {
        Self { key: Ok(key) }
    }

    /// Verifier with no key. Fails closed on every call.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        error!(
            target: "offlock::deployment",
            reason = %reason,
            "license public key unavailable, all license checks will fail"
        );
        Self { key: Err(reason) }
    }

    /// Load the public key from `path`, failing closed if it cannot be read.
    pub fn load(path: &Path) -> Self {
        match LicensePublicKey::from_pem_file(path) {
            Ok(key) => Self::new(key),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    /// Whether a public key is loaded.
    pub fn has_key(&self) -> bool {
        self.key.is_ok()
    }

    /// Why the key is unavailable, if it is.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.key.as_ref().err().map(String::as_str)
    }

    /// Verify `signature_b64` over the bytes obtained by decoding `payload_b64`.
    pub fn verify(&self, payload_b64: &str, signature_b64: &str) -> bool {
        match decode_base64(payload_b64) {
            Ok(message) => self.verify_bytes(&message, signature_b64),
            Err(e) => {
                debug!(error = %e, "payload is not valid base64");
                false
            }
        }
    }

    /// Verify `signature_b64` over `message`.
    pub fn verify_bytes(&self, message: &[u8], signature_b64: &str) -> bool {
        let Ok(key) = &self.key else {
            return false;
        };

        let sig_bytes = match decode_base64(signature_b64) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(error = %e, "signature is not valid base64");
                return false;
            }
        };

        let signature = match Signature::try_from(sig_bytes.as_slice()) {
            Ok(sig) => sig,
            Err(e) => {
                debug!(error = %e, "malformed signature");
                return false;
            }
        };

        key.verifying_key().verify(message, &signature).is_ok()
    }
}
