//! Activation and startup policy.

pub mod binding;
pub mod key_format;
