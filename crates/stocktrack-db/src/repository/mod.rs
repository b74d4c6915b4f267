//! # Repository Module
//!
//! Database repository implementations for Stocktrack.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Service call                                                           │
//! │       │                                                                 │
//! │       │  db.movements().create(new_movement)                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  MovementRepository (the ledger engine)                                 │
//! │  ├── create(&self, new)        ← movement row + aggregate, one tx       │
//! │  ├── delete(&self, id)         ← reversal guarded against underflow     │
//! │  ├── list_for_product(&self, id)                                        │
//! │  └── stats(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite store                                                           │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                         │
//! │  • SQL is isolated in one place                                         │
//! │  • The ledger transaction has exactly one owner                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`product::ProductRepository`] - Product CRUD and the low-stock view
//! - [`movement::MovementRepository`] - The stock ledger engine and stats

pub mod category;
pub mod movement;
pub mod product;
