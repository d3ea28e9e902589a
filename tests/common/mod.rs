//! Shared helpers for integration tests.
//!
//! The issuer keys under `tests/fixtures/` are test-only.

#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine};
use offlock::identity::IdentityProbe;
use offlock::{MachineIdResolver, SignedLicenseArtifact};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;

pub const LICENSE_KEY: &str = "ABCDE-FGHIJ-KLMNO-PQRST-UVWXY";

pub const ISSUER_A_PRIVATE_PEM: &str = include_str!("../fixtures/issuer_a.key");
pub const ISSUER_A_PUBLIC_PEM: &str = include_str!("../fixtures/issuer_a.pub.pem");
pub const ISSUER_B_PRIVATE_PEM: &str = include_str!("../fixtures/issuer_b.key");

/// Sign `payload_json` with a PKCS#8 private key into an importable artifact.
pub fn sign_artifact(private_pem: &str, payload_json: &str) -> SignedLicenseArtifact {
    let key = RsaPrivateKey::from_pkcs8_pem(private_pem).unwrap();
    let signature = SigningKey::<Sha256>::new(key).sign(payload_json.as_bytes());
    SignedLicenseArtifact::new(
        STANDARD.encode(payload_json.as_bytes()),
        STANDARD.encode(signature.to_bytes()),
    )
    .with_license_key(LICENSE_KEY)
}

/// Probe that always reports the same identifier.
pub struct FixedProbe(pub &'static str);

impl IdentityProbe for FixedProbe {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn probe(&self) -> Option<String> {
        Some(self.0.to_string())
    }
}

/// Resolver that always yields `id`.
pub fn fixed_resolver(id: &'static str) -> MachineIdResolver {
    MachineIdResolver::new(vec![Box::new(FixedProbe(id))], vec![])
}
