//! File-based record store with atomic writes.
//!
//! Writes go to a sibling temp file which is flushed to disk and then renamed
//! over the record, so a crash never leaves a half-written record behind.

use crate::store::format::StoredLicenseRecord;
use crate::store::RecordStore;
use crate::OfflockError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores the license record as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    /// Store the record at `path`, creating the parent directory.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, OfflockError> {
        let path = path.into();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                OfflockError::StoreIO(format!("Failed to create record dir: {}", e))
            })?;
        }
        Ok(Self { path })
    }

    /// Location of the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> Result<Option<StoredLicenseRecord>, OfflockError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)
            .map_err(|e| OfflockError::StoreIO(format!("Failed to read record: {}", e)))?;

        StoredLicenseRecord::from_json(&json).map(Some)
    }

    fn save(&self, record: &StoredLicenseRecord) -> Result<(), OfflockError> {
        let temp_path = self.temp_path();
        let json = record.to_json()?;

        let written = write_synced(&temp_path, json.as_bytes()).and_then(|()| {
            fs::rename(&temp_path, &self.path)
                .map_err(|e| OfflockError::StoreIO(format!("Failed to replace record: {}", e)))
        });
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(error = %cleanup, "temp record not removed");
            }
            return Err(e);
        }

        debug!(path = %self.path.display(), "license record saved");
        Ok(())
    }

    fn delete(&self) -> Result<(), OfflockError> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .map_err(|e| OfflockError::StoreIO(format!("Failed to delete record: {}", e)))?;
            debug!(path = %self.path.display(), "license record deleted");
        }
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), OfflockError> {
    let mut file = File::create(path)
        .map_err(|e| OfflockError::StoreIO(format!("Failed to create temp file: {}", e)))?;
    file.write_all(bytes)
        .map_err(|e| OfflockError::StoreIO(format!("Failed to write temp file: {}", e)))?;
    file.sync_all()
        .map_err(|e| OfflockError::StoreIO(format!("Failed to flush temp file: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::MachineId;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn make_record(key: &str) -> StoredLicenseRecord {
        StoredLicenseRecord::bind(
            key.to_string(),
            &MachineId::new("AA11BB22CC33"),
            None,
            "cGF5bG9hZA==".to_string(),
            "c2lnbmF0dXJl".to_string(),
            Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("license.json")).unwrap();

        let record = make_record("ABCDE-FGHIJ-KLMNO-PQRST-UVWXY");
        store.save(&record).unwrap();

        assert_eq!(store.load().unwrap(), Some(record));
    }

    #[test]
    fn load_nonexistent() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("license.json")).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn creates_parent_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("nested/app/license.json")).unwrap();
        store.save(&make_record("K")).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn delete_removes_record() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("license.json")).unwrap();

        store.save(&make_record("K")).unwrap();
        store.delete().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Deleting again is fine.
        store.delete().unwrap();
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("license.json")).unwrap();

        store.save(&make_record("FIRST")).unwrap();
        store.save(&make_record("SECOND")).unwrap();

        assert_eq!(store.load().unwrap().unwrap().key, "SECOND");
        assert!(!dir.path().join("license.json.tmp").exists());
    }

    #[test]
    fn stale_temp_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let store = FileRecordStore::new(dir.path().join("license.json")).unwrap();

        store.save(&make_record("GOOD")).unwrap();
        // Simulate a crash mid-write of a later save.
        fs::write(dir.path().join("license.json.tmp"), "{\"key\": \"HAL").unwrap();

        assert_eq!(store.load().unwrap().unwrap().key, "GOOD");
    }

    #[test]
    fn corrupt_record_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("license.json");
        fs::write(&path, "{\"key\": \"HAL").unwrap();

        let store = FileRecordStore::new(path).unwrap();
        assert!(matches!(store.load(), Err(OfflockError::StoreIO(_))));
    }

    #[test]
    fn failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("license.json");
        // A directory in the record's place makes the final rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let store = FileRecordStore::new(&path).unwrap();
        assert!(matches!(
            store.save(&make_record("K")),
            Err(OfflockError::StoreIO(_))
        ));
        assert!(!dir.path().join("license.json.tmp").exists());
    }
}
