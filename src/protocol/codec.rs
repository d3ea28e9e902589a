//! Payload and artifact decoding.
//!
//! Decoding only; encoding and signing belong to the license issuer.

use crate::errors::CorruptReason;
use crate::protocol::models::{LicensePayload, SignedLicenseArtifact};
use crate::OfflockError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

/// Standard alphabet, padding optional, canonical trailing bits required.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode base64 text into raw bytes.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    LENIENT_BASE64.decode(text.trim())
}

/// Decode a base64 payload into license terms.
///
/// The result is untrusted until the signature over the same bytes has been
/// verified.
pub fn decode_payload(payload_b64: &str) -> Result<LicensePayload, OfflockError> {
    let bytes = decode_base64(payload_b64).map_err(|e| {
        debug!(error = %e, "payload is not valid base64");
        OfflockError::corrupt(CorruptReason::PayloadUndecodable)
    })?;
    decode_payload_bytes(&bytes)
}

/// Decode already base64-decoded payload bytes.
pub fn decode_payload_bytes(bytes: &[u8]) -> Result<LicensePayload, OfflockError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        debug!(error = %e, "payload is not valid UTF-8");
        OfflockError::corrupt(CorruptReason::PayloadUndecodable)
    })?;

    serde_json::from_str(text).map_err(|e| {
        debug!(error = %e, "payload is not a valid license JSON object");
        OfflockError::corrupt(CorruptReason::PayloadUndecodable)
    })
}

/// Parse an imported license file.
pub fn parse_artifact(json: &str) -> Result<SignedLicenseArtifact, OfflockError> {
    // Tolerate a UTF-8 BOM written by some editors.
    let json = json.trim_start_matches('\u{feff}');
    serde_json::from_str(json).map_err(|e| {
        debug!(error = %e, "license file is not a valid artifact");
        OfflockError::corrupt(CorruptReason::ArtifactMalformed)
    })
}
