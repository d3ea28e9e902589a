//! Offlock configuration.

use crate::OfflockError;
use std::path::PathBuf;

/// Default file name of the persisted license record.
pub const DEFAULT_RECORD_FILE: &str = "license.json";

/// Configuration for offline license activation.
///
/// The public key location is a deployment decision and should be fixed in
/// the embedding application, not taken from the environment.
#[derive(Debug, Clone)]
pub struct OfflockConfig {
    /// Application name; the record lives under `dirs::data_dir()/<app_name>/`.
    pub app_name: String,

    /// Location of the issuer's PEM-encoded RSA public key.
    pub public_key_path: PathBuf,

    /// File name of the persisted license record.
    pub record_file_name: String,

    /// Directory overriding the platform data directory.
    pub record_dir: Option<PathBuf>,

    /// Re-verify the stored payload signature during the startup check.
    /// A failed re-verification denies startup but never erases the record.
    pub reverify_on_startup: bool,
}

impl OfflockConfig {
    /// Create a configuration with defaults for everything but the app name
    /// and public key location.
    pub fn new(app_name: impl Into<String>, public_key_path: impl Into<PathBuf>) -> Self {
        Self {
            app_name: app_name.into(),
            public_key_path: public_key_path.into(),
            record_file_name: DEFAULT_RECORD_FILE.to_string(),
            record_dir: None,
            reverify_on_startup: false,
        }
    }

    /// Store the record under `dir` instead of the platform data directory.
    pub fn with_record_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.record_dir = Some(dir.into());
        self
    }

    /// Enable or disable signature re-verification at startup.
    pub fn with_reverify_on_startup(mut self, enabled: bool) -> Self {
        self.reverify_on_startup = enabled;
        self
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), OfflockError> {
        if self.app_name.trim().is_empty() {
            return Err(OfflockError::ConfigError(
                "app_name cannot be empty".to_string(),
            ));
        }
        if self.public_key_path.as_os_str().is_empty() {
            return Err(OfflockError::ConfigError(
                "public_key_path cannot be empty".to_string(),
            ));
        }
        if self.record_file_name.is_empty()
            || self.record_file_name.contains(|c| c == '/' || c == '\\')
        {
            return Err(OfflockError::ConfigError(format!(
                "record_file_name must be a plain file name, got {:?}",
                self.record_file_name
            )));
        }
        Ok(())
    }

    /// Directory holding the license record.
    pub fn record_dir(&self) -> Result<PathBuf, OfflockError> {
        if let Some(dir) = &self.record_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir().ok_or_else(|| {
            OfflockError::StoreIO("Could not find data directory".to_string())
        })?;
        Ok(base.join(&self.app_name))
    }

    /// Full path of the license record.
    pub fn record_path(&self) -> Result<PathBuf, OfflockError> {
        Ok(self.record_dir()?.join(&self.record_file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = OfflockConfig::new("pos", "/opt/pos/public.pem");
        assert_eq!(config.record_file_name, DEFAULT_RECORD_FILE);
        assert!(!config.reverify_on_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_app_name_rejected() {
        let config = OfflockConfig::new("  ", "/opt/pos/public.pem");
        assert!(matches!(config.validate(), Err(OfflockError::ConfigError(_))));
    }

    #[test]
    fn record_file_name_must_be_plain() {
        let mut config = OfflockConfig::new("pos", "/opt/pos/public.pem");
        config.record_file_name = "../escape.json".to_string();
        assert!(matches!(config.validate(), Err(OfflockError::ConfigError(_))));
    }

    #[test]
    fn record_dir_override() {
        let config = OfflockConfig::new("pos", "key.pem").with_record_dir("/tmp/pos-test");
        assert_eq!(
            config.record_path().unwrap(),
            PathBuf::from("/tmp/pos-test").join(DEFAULT_RECORD_FILE)
        );
    }
}
