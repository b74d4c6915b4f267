//! # Store Handle Lifecycle
//!
//! Owns the single active store handle and serializes replacing it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      StoreManager Lifecycle                             │
//! │                                                                         │
//! │  (disconnected) ──connect(a.db)──► [a.db active]                        │
//! │                                        │                                │
//! │                              connect(b.db)                              │
//! │                                        │  close a.db pool (drains       │
//! │                                        ▼  in-flight work), open b.db    │
//! │                                   [b.db active]                         │
//! │                                        │                                │
//! │                                     close()                             │
//! │                                        ▼                                │
//! │                                  (disconnected)                         │
//! │                                                                         │
//! │  handle() on a disconnected manager → DbError::NotConnected             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! The handle lives behind a `tokio::sync::RwLock`. Callers take a read
//! lock just long enough to clone the pool handle; connect/close take the
//! write lock, so no caller ever observes a half-closed or half-opened
//! store. Operations already running on a replaced handle finish against
//! the old pool - `close` waits for them to release their connections.
//!
//! The manager is an explicitly constructed object passed by reference,
//! not a hidden global: tests instantiate isolated managers per case.

use std::path::Path;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::pool::{Database, DbConfig};

/// Holds the single active store handle, switchable at runtime.
#[derive(Debug, Default)]
pub struct StoreManager {
    active: RwLock<Option<Database>>,
}

impl StoreManager {
    /// Creates a manager with no store connected.
    pub fn new() -> Self {
        StoreManager {
            active: RwLock::new(None),
        }
    }

    /// Opens the store at `path`, replacing any currently active store.
    ///
    /// ## What This Does
    /// 1. Takes the exclusive lock (new callers wait here)
    /// 2. Closes the previous pool, draining in-flight operations
    /// 3. Opens the new file, runs migrations, seeds an empty store
    /// 4. Publishes the new handle
    ///
    /// Switching is a full replace, not a merge. On failure the manager is
    /// left disconnected rather than pointing at the closed old store.
    pub async fn connect(&self, path: impl AsRef<Path>) -> DbResult<()> {
        self.connect_with(DbConfig::new(path.as_ref())).await
    }

    /// Like [`connect`](Self::connect) but with explicit configuration
    /// (tests use this with [`DbConfig::in_memory`]).
    pub async fn connect_with(&self, config: DbConfig) -> DbResult<()> {
        let mut guard = self.active.write().await;

        if let Some(previous) = guard.take() {
            previous.close().await;
        }

        let path = config.database_path.display().to_string();
        let db = Database::new(config).await?;
        *guard = Some(db);

        info!(path = %path, "Store connected");
        Ok(())
    }

    /// Returns a clone of the active store handle.
    ///
    /// ## Errors
    /// * `DbError::NotConnected` - no store is open
    pub async fn handle(&self) -> DbResult<Database> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(DbError::NotConnected)
    }

    /// Whether a store is currently open.
    pub async fn is_connected(&self) -> bool {
        self.active.read().await.is_some()
    }

    /// Closes the active store, if any.
    ///
    /// Idempotent: closing a disconnected manager is a no-op.
    pub async fn close(&self) {
        let mut guard = self.active.write().await;

        if let Some(db) = guard.take() {
            db.close().await;
            info!("Store disconnected");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
