//! License record persistence.

pub mod file;
pub mod format;

use crate::OfflockError;
use format::StoredLicenseRecord;

/// Storage for the single bound license record.
pub trait RecordStore: Send + Sync {
    /// Load the record, `None` if nothing has been activated.
    fn load(&self) -> Result<Option<StoredLicenseRecord>, OfflockError>;

    /// Persist the record, replacing any previous one atomically.
    fn save(&self, record: &StoredLicenseRecord) -> Result<(), OfflockError>;

    /// Erase the record. Erasing a missing record succeeds.
    fn delete(&self) -> Result<(), OfflockError>;
}
