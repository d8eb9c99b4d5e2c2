//! Export settings persistence.
//!
//! Stores settings in the platform-specific config directory:
//! - Linux: ~/.config/netexport/settings.json
//! - macOS: ~/Library/Application Support/netexport/settings.json
//! - Windows: %APPDATA%/netexport/settings.json

use std::path::PathBuf;

use netexport_domain::ExportSettings;
use tokio::fs;

use crate::serialization::{SerializationError, from_json_bytes, to_json_stable_bytes};

const APP_DIR: &str = "netexport";
const SETTINGS_FILE: &str = "settings.json";

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Repository for export settings persistence.
#[derive(Debug, Clone, Default)]
pub struct SettingsRepository {
    path: Option<PathBuf>,
}

impl SettingsRepository {
    /// Creates a repository backed by the platform config directory.
    #[must_use]
    pub const fn new() -> Self {
        Self { path: None }
    }

    /// Creates a repository backed by an explicit file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the default settings path, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Returns the path where settings are stored, if available.
    #[must_use]
    pub fn settings_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(Self::default_path)
    }

    /// Loads settings from disk.
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ExportSettings, SettingsError> {
        let Some(path) = self.settings_path() else {
            return Ok(ExportSettings::default());
        };

        match fs::read(&path).await {
            Ok(content) => Ok(from_json_bytes(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                Ok(ExportSettings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Saves settings to disk, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no location is known or the write fails.
    pub async fn save(&self, settings: &ExportSettings) -> Result<(), SettingsError> {
        let path = self.settings_path().ok_or(SettingsError::NoConfigDir)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let content = to_json_stable_bytes(settings)?;
        fs::write(&path, content).await?;
        Ok(())
    }

}
