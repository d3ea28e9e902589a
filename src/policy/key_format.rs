//! License key format pre-filter.
//!
//! Five groups of five ASCII alphanumerics joined by hyphens. This is a cheap
//! input check only; the signature is authoritative.

use crate::OfflockError;

const GROUPS: usize = 5;
const GROUP_LEN: usize = 5;

/// Whether `key` looks like `ABCDE-FGHIJ-KLMNO-PQRST-UVWXY`.
pub fn is_valid_key_format(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == GROUPS
        && groups
            .iter()
            .all(|g| g.len() == GROUP_LEN && g.bytes().all(|b| b.is_ascii_alphanumeric()))
}

/// [`is_valid_key_format`] as a `Result`.
pub fn check_key_format(key: &str) -> Result<(), OfflockError> {
    if is_valid_key_format(key) {
        Ok(())
    } else {
        Err(OfflockError::KeyFormatInvalid)
    }
}
