//! # Store Service
//!
//! Store file management: the "which inventory file am I working in" layer.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_stores()     ← every *.db file in the data dir, active flagged    │
//! │  create_store(n)   ← new file + schema + seed, becomes active           │
//! │  switch_store(n)   ← full replace of the active handle                  │
//! │  current_store()   ← metadata of the active file                        │
//! │  backup_store()    ← timestamped file copy next to the original         │
//! │  delete_store(n)   ← remove an INACTIVE store file                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The last opened store name is persisted through [`ConfigManager`] so the
//! next session reopens it.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::info;

use stocktrack_db::StoreManager;

use crate::config::ConfigManager;
use crate::error::{ApiError, ErrorCode};
use crate::paths::{normalize_store_name, PathManager};

/// Metadata about one store file in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    /// File name (e.g. `depo.db`).
    pub name: String,

    /// Absolute path of the file.
    pub path: String,

    /// File size in bytes.
    pub size_bytes: u64,

    /// Last modified time, formatted for display.
    pub modified: Option<String>,

    /// Whether this is the currently connected store.
    pub is_active: bool,
}

/// Service for store file management.
#[derive(Debug, Clone)]
pub struct StoreService {
    manager: Arc<StoreManager>,
    paths: PathManager,
    config: Arc<ConfigManager>,
}

impl StoreService {
    /// Creates a new store service.
    pub fn new(manager: Arc<StoreManager>, paths: PathManager, config: Arc<ConfigManager>) -> Self {
        StoreService {
            manager,
            paths,
            config,
        }
    }

    /// Whether a store is currently open.
    pub async fn is_connected(&self) -> bool {
        self.manager.is_connected().await
    }

    /// Lists every store file in the data directory.
    pub async fn list_stores(&self) -> Result<Vec<StoreInfo>, ApiError> {
        let active = self.active_store_name().await;

        let mut stores = Vec::new();
        for name in self.paths.list_store_files()? {
            let path = self.paths.store_path(&name);

            // A file that vanished between listing and stat is skipped
            let Ok(metadata) = fs::metadata(&path) else {
                continue;
            };

            stores.push(StoreInfo {
                is_active: active.as_deref() == Some(name.as_str()),
                name,
                path: path.display().to_string(),
                size_bytes: metadata.len(),
                modified: metadata.modified().ok().map(format_mtime),
            });
        }

        Ok(stores)
    }

    /// Creates a new store file and makes it the active one.
    pub async fn create_store(&self, name: &str) -> Result<StoreInfo, ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::validation("store name cannot be empty"));
        }

        let name = normalize_store_name(name);
        self.paths.ensure_data_dir()?;

        let path = self.paths.store_path(&name);
        if path.exists() {
            return Err(ApiError::validation(format!(
                "store '{name}' already exists"
            )));
        }

        self.manager.connect(&path).await?;
        self.config.set_last_store(&name)?;

        info!(store = %name, "Store created");
        self.current_store().await
    }

    /// Switches to another store file. A full replace, not a merge.
    pub async fn switch_store(&self, name: &str) -> Result<StoreInfo, ApiError> {
        let name = normalize_store_name(name);
        let path = self.paths.store_path(&name);

        if !path.exists() {
            return Err(ApiError::not_found("Store", &name));
        }

        self.manager.connect(&path).await?;
        self.config.set_last_store(&name)?;

        info!(store = %name, "Store switched");
        self.current_store().await
    }

    /// Metadata of the currently connected store.
    pub async fn current_store(&self) -> Result<StoreInfo, ApiError> {
        let name = self
            .active_store_name()
            .await
            .ok_or_else(|| ApiError::new(ErrorCode::NotConnected, "no store connected"))?;

        let path = self.paths.store_path(&name);
        let metadata = fs::metadata(&path)?;

        Ok(StoreInfo {
            name,
            path: path.display().to_string(),
            size_bytes: metadata.len(),
            modified: metadata.modified().ok().map(format_mtime),
            is_active: true,
        })
    }

    /// Deletes an inactive store file.
    pub async fn delete_store(&self, name: &str) -> Result<(), ApiError> {
        let name = normalize_store_name(name);

        if self.active_store_name().await.as_deref() == Some(name.as_str()) {
            return Err(ApiError::validation(
                "cannot delete the currently connected store",
            ));
        }

        let path = self.paths.store_path(&name);
        if !path.exists() {
            return Err(ApiError::not_found("Store", &name));
        }

        fs::remove_file(&path)?;
        info!(store = %name, "Store file deleted");
        Ok(())
    }

    /// Copies the active store to a timestamped backup file next to it.
    ///
    /// Returns the path of the backup.
    pub async fn backup_store(&self) -> Result<PathBuf, ApiError> {
        let name = self
            .active_store_name()
            .await
            .ok_or_else(|| ApiError::new(ErrorCode::NotConnected, "no store connected"))?;

        let source = self.paths.store_path(&name);
        let stem = name.strip_suffix(".db").unwrap_or(&name);
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let backup = self
            .paths
            .store_path(&format!("{stem}_backup_{timestamp}.db"));

        fs::copy(&source, &backup)?;

        info!(source = %source.display(), backup = %backup.display(), "Store backed up");
        Ok(backup)
    }

    /// The active store's file name: connected, and recorded in config.
    async fn active_store_name(&self) -> Option<String> {
        if !self.manager.is_connected().await {
            return None;
        }
        self.config.last_store()
    }
}

fn format_mtime(mtime: std::time::SystemTime) -> String {
    DateTime::<Local>::from(mtime)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn service_in(dir: &std::path::Path) -> StoreService {
        let paths = PathManager::new(dir);
        let config = Arc::new(ConfigManager::load(paths.config_path()));
        StoreService::new(Arc::new(StoreManager::new()), paths, config)
    }

    #[tokio::test]
    async fn test_create_store_connects_and_persists_choice() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        assert!(!service.is_connected().await);

        let info = service.create_store("depo").await.unwrap();
        assert_eq!(info.name, "depo.db");
        assert!(info.is_active);
        assert!(service.is_connected().await);
        assert!(dir.path().join("depo.db").exists());

        // The choice survives in config for the next session
        let reloaded = ConfigManager::load(dir.path().join("config.json"));
        assert_eq!(reloaded.last_store().as_deref(), Some("depo.db"));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        let err = service.create_store("  ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        service.create_store("depo").await.unwrap();
        let err = service.create_store("depo.db").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_list_marks_the_active_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        service.create_store("a").await.unwrap();
        service.create_store("b").await.unwrap();

        let stores = service.list_stores().await.unwrap();
        let names: Vec<(&str, bool)> = stores
            .iter()
            .map(|s| (s.name.as_str(), s.is_active))
            .collect();

        assert_eq!(names, vec![("a.db", false), ("b.db", true)]);
    }

    #[tokio::test]
    async fn test_switch_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        service.create_store("a").await.unwrap();
        service.create_store("b").await.unwrap();

        let info = service.switch_store("a").await.unwrap();
        assert_eq!(info.name, "a.db");
        assert!(info.is_active);

        let err = service.switch_store("missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_delete_refuses_the_active_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        service.create_store("a").await.unwrap();
        service.create_store("b").await.unwrap();

        let err = service.delete_store("b").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        service.delete_store("a").await.unwrap();
        assert!(!dir.path().join("a.db").exists());

        let err = service.delete_store("a").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_backup_copies_the_active_store() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        service.create_store("depo").await.unwrap();
        let backup = service.backup_store().await.unwrap();

        assert!(backup.exists());
        let backup_name = backup.file_name().unwrap().to_str().unwrap();
        assert!(backup_name.starts_with("depo_backup_"));
        assert!(backup_name.ends_with(".db"));

        // The backup shows up in the listing, inactive
        let stores = service.list_stores().await.unwrap();
        assert_eq!(stores.len(), 2);
        assert_eq!(stores.iter().filter(|s| s.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_backup_requires_connection() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_in(dir.path());

        let err = service.backup_store().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotConnected);

        let err = service.current_store().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotConnected);
    }
}
