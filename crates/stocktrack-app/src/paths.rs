//! # Path Management
//!
//! Resolves where store files and the config file live on disk.
//!
//! ## Layout
//! ```text
//! <data dir>/                     (platform dir via `directories`, or injected)
//! ├── config.json                 ← last opened store
//! ├── depo.db                     ← one SQLite store per file
//! ├── depo_backup_20260807_142301.db
//! └── arsiv.db
//! ```
//!
//! Tests inject a temp directory instead of the platform one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Extension every store file carries.
pub const STORE_EXTENSION: &str = "db";

/// Resolves and manages paths inside the application data directory.
#[derive(Debug, Clone)]
pub struct PathManager {
    data_dir: PathBuf,
}

impl PathManager {
    /// Creates a manager over an explicit data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        PathManager {
            data_dir: data_dir.into(),
        }
    }

    /// Creates a manager over the platform data directory
    /// (e.g. `~/.local/share/stocktrack` on Linux).
    ///
    /// Returns `None` when the platform provides no home directory.
    pub fn from_project_dirs() -> Option<Self> {
        let dirs = ProjectDirs::from("com", "stocktrack", "stocktrack")?;
        Some(PathManager::new(dirs.data_dir()))
    }

    /// The data directory this manager works in.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Creates the data directory if it doesn't exist yet.
    pub fn ensure_data_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.data_dir)
    }

    /// Path of the config file.
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    /// Full path for a store file name (extension normalized).
    pub fn store_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(normalize_store_name(name))
    }

    /// Lists store file names in the data directory, sorted.
    ///
    /// A missing data directory is an empty list, not an error: nothing has
    /// been created yet.
    pub fn list_store_files(&self) -> io::Result<Vec<String>> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()?.to_str()? != STORE_EXTENSION {
                    return None;
                }
                Some(path.file_name()?.to_str()?.to_string())
            })
            .collect();

        names.sort();
        Ok(names)
    }
}

/// Appends the `.db` extension unless the name already carries it.
pub fn normalize_store_name(name: &str) -> String {
    let name = name.trim();
    if Path::new(name)
        .extension()
        .is_some_and(|ext| ext == STORE_EXTENSION)
    {
        name.to_string()
    } else {
        format!("{name}.{STORE_EXTENSION}")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
