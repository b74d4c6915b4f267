//! # Application Configuration
//!
//! JSON-file persistence for the small amount of state that outlives a
//! session: which store file was open last.
//!
//! ## Persistence
//! The config lives as `config.json` in the data directory. Only the store
//! FILENAME is saved, never the full path, so a data folder can be moved
//! between machines and keep working.
//!
//! A missing or unreadable file degrades to defaults; saving creates the
//! parent directory on demand.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Persisted application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Filename of the last opened store (e.g. `depo.db`).
    pub last_store: Option<String>,
}

/// Config persistence errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loads, caches, and saves the application configuration.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    current: RwLock<AppConfig>,
}

impl ConfigManager {
    /// Loads the config from `path`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Config file unreadable, using defaults");
                    AppConfig::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "No config file yet, using defaults");
                AppConfig::default()
            }
        };

        ConfigManager {
            path,
            current: RwLock::new(current),
        }
    }

    /// Where this manager reads and writes its file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a snapshot of the current configuration.
    pub fn config(&self) -> AppConfig {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The last opened store filename, if any.
    pub fn last_store(&self) -> Option<String> {
        self.config().last_store
    }

    /// Records `name` as the last opened store and saves the file.
    pub fn set_last_store(&self, name: &str) -> Result<(), ConfigError> {
        let snapshot = {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            guard.last_store = Some(name.to_string());
            guard.clone()
        };

        self.save(&snapshot)
    }

    fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, raw)?;

        debug!(path = %self.path.display(), "Config saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::load(dir.path().join("config.json"));

        assert_eq!(manager.config(), AppConfig::default());
        assert!(manager.last_store().is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let manager = ConfigManager::load(&path);
        manager.set_last_store("depo.db").unwrap();

        // A fresh manager sees the persisted value
        let reloaded = ConfigManager::load(&path);
        assert_eq!(reloaded.last_store().as_deref(), Some("depo.db"));
    }

    #[test]
    fn test_corrupt_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let manager = ConfigManager::load(&path);
        assert_eq!(manager.config(), AppConfig::default());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let manager = ConfigManager::load(&path);
        manager.set_last_store("a.db").unwrap();

        assert!(path.exists());
    }
}
