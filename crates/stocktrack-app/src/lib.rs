//! # Stocktrack Application Library
//!
//! The binding layer a UI host drives. Bundles the store lifecycle, the
//! services, config persistence, and path resolution behind one entry
//! point.
//!
//! ## Module Organization
//! ```text
//! stocktrack_app/
//! ├── lib.rs          ◄─── You are here (AppServices + tracing setup)
//! ├── services/
//! │   ├── mod.rs      ◄─── Service exports
//! │   ├── category.rs ◄─── Category CRUD
//! │   ├── product.rs  ◄─── Product CRUD + low-stock view
//! │   ├── movement.rs ◄─── The four ledger operations
//! │   └── store.rs    ◄─── Store file management
//! ├── config.rs       ◄─── JSON config (last opened store)
//! ├── paths.rs        ◄─── Data dir and store file paths
//! └── error.rs        ◄─── ApiError for the UI boundary
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. init_tracing() ─────────────────────────────────────────────────►   │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: INFO, can be overridden with RUST_LOG                    │
//! │                                                                         │
//! │  2. AppServices::from_platform_dirs() ──────────────────────────────►   │
//! │     • Linux: ~/.local/share/stocktrack                                  │
//! │     • macOS: ~/Library/Application Support/com.stocktrack.stocktrack    │
//! │     • Loads config.json                                                 │
//! │                                                                         │
//! │  3. services.bootstrap().await ─────────────────────────────────────►   │
//! │     • Reopens the last store if its file still exists                   │
//! │     • Otherwise stays disconnected until the host picks one             │
//! │                                                                         │
//! │  4. Host binds the services to its command surface                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod services;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stocktrack_db::StoreManager;

pub use config::{AppConfig, ConfigManager};
pub use error::{ApiError, ErrorCode};
pub use paths::PathManager;
pub use services::{
    CategoryService, MovementService, ProductService, StoreInfo, StoreService,
};

/// Initializes tracing for the process.
///
/// `RUST_LOG` overrides the default `info` filter. Safe to call more than
/// once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Everything a UI host needs, wired together.
///
/// One `AppServices` per process; the services inside share a single
/// [`StoreManager`] so they always see the same active store.
#[derive(Debug, Clone)]
pub struct AppServices {
    manager: Arc<StoreManager>,
    config: Arc<ConfigManager>,
    paths: PathManager,

    pub categories: CategoryService,
    pub products: ProductService,
    pub movements: MovementService,
    pub stores: StoreService,
}

impl AppServices {
    /// Builds the service bundle over an explicit data directory.
    pub fn new(paths: PathManager) -> Self {
        let config = Arc::new(ConfigManager::load(paths.config_path()));
        let manager = Arc::new(StoreManager::new());

        AppServices {
            categories: CategoryService::new(manager.clone()),
            products: ProductService::new(manager.clone()),
            movements: MovementService::new(manager.clone()),
            stores: StoreService::new(manager.clone(), paths.clone(), config.clone()),
            manager,
            config,
            paths,
        }
    }

    /// Builds the service bundle over the platform data directory.
    ///
    /// Returns `None` when the platform provides no home directory.
    pub fn from_platform_dirs() -> Option<Self> {
        PathManager::from_project_dirs().map(AppServices::new)
    }

    /// Reopens the last used store, if the config names one and its file
    /// still exists.
    ///
    /// Returns whether a store ended up connected. A missing file is not an
    /// error - the host shows its store picker instead.
    pub async fn bootstrap(&self) -> Result<bool, ApiError> {
        let Some(name) = self.config.last_store() else {
            info!("No previous store recorded");
            return Ok(false);
        };

        let path = self.paths.store_path(&name);
        if !path.exists() {
            warn!(store = %name, "Last used store file is gone");
            return Ok(false);
        }

        self.stores.switch_store(&name).await?;
        info!(store = %name, "Reopened last used store");
        Ok(true)
    }

    /// The shared store lifecycle manager.
    pub fn manager(&self) -> &Arc<StoreManager> {
        &self.manager
    }

    /// The shared config manager.
    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    /// The path manager for the data directory.
    pub fn paths(&self) -> &PathManager {
        &self.paths
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
