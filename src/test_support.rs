//! Fixed issuer key pairs and signing helpers for unit tests.
//!
//! DO NOT USE THESE KEYS IN PRODUCTION.

use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::Sha256;

pub const ISSUER_A_PRIVATE_PEM: &str = include_str!("../tests/fixtures/issuer_a.key");
pub const ISSUER_A_PUBLIC_PEM: &str = include_str!("../tests/fixtures/issuer_a.pub.pem");
pub const ISSUER_A_PKCS1_PEM: &str = include_str!("../tests/fixtures/issuer_a.pkcs1.pem");
pub const ISSUER_B_PRIVATE_PEM: &str = include_str!("../tests/fixtures/issuer_b.key");
pub const ISSUER_B_PUBLIC_PEM: &str = include_str!("../tests/fixtures/issuer_b.pub.pem");

pub fn issuer_a() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(ISSUER_A_PRIVATE_PEM).unwrap()
}

pub fn issuer_b() -> RsaPrivateKey {
    RsaPrivateKey::from_pkcs8_pem(ISSUER_B_PRIVATE_PEM).unwrap()
}

/// Sign `message`, returning `(payload_b64, signature_b64)`.
pub fn sign_with(private_key: &RsaPrivateKey, message: &[u8]) -> (String, String) {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key.sign(message);
    (STANDARD.encode(message), STANDARD.encode(signature.to_bytes()))
}
