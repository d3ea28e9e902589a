//! Cryptographic primitives for license verification.

pub mod key;
pub mod verify;
