//! # stocktrack-db: Database Layer for Stocktrack
//!
//! This crate provides storage access for the Stocktrack system.
//! It uses SQLite for local single-file stores with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stocktrack Data Flow                              │
//! │                                                                         │
//! │  Service call (create_movement)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   stocktrack-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐   │   │
//! │  │   │ StoreManager  │    │  Repositories │    │  Migrations  │   │   │
//! │  │   │ (manager.rs)  │    │ (movement.rs) │    │ (schema DDL) │   │   │
//! │  │   │               │    │               │    │              │   │   │
//! │  │   │ active handle │───►│ MovementRepo  │    │ idempotent   │   │   │
//! │  │   │ connect/close │    │ = the ledger  │    │ + seed data  │   │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    SQLite store (one file)                      │   │
//! │  │   categories ◄── products ◄── stock_movements                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Idempotent schema creation and default seed data
//! - [`manager`] - Active store handle lifecycle (connect / switch / close)
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (category, product, movement)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stocktrack_db::{Database, DbConfig, StoreManager};
//!
//! // One long-lived manager per process
//! let manager = StoreManager::new();
//! manager.connect("path/to/store.db").await?;
//!
//! // Grab the active handle and use repositories
//! let db = manager.handle().await?;
//! let stats = db.movements().stats().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod manager;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use manager::StoreManager;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
