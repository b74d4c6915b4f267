//! # Database Error Types
//!
//! Error types for storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in stocktrack-app) ← Serialized for the UI host              │
//! │                                                                         │
//! │  Ledger rule violations (CoreError) travel through the `Domain`         │
//! │  variant so repository methods have a single error type.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use stocktrack_core::CoreError;

/// Storage operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// No store is currently open.
    ///
    /// ## When This Occurs
    /// - Any operation requested before `StoreManager::connect`
    /// - Any operation requested after `StoreManager::close`
    #[error("no store connected")]
    NotConnected,

    /// Entity not found in the store.
    ///
    /// ## When This Occurs
    /// - Referenced product/movement/category id doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate product code
    /// - Inserting a duplicate category name
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Referencing a non-existent category_id or product_id
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Store file could not be opened.
    ///
    /// ## When This Occurs
    /// - File permissions issue
    /// - Disk full
    /// This is the only session-fatal failure during startup.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to commit.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// A ledger rule rejected the operation (no writes persisted).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

/// Result type for storage operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through_transparently() {
        let err: DbError = CoreError::InsufficientStock {
            available: 3,
            requested: 5,
        }
        .into();

        // `transparent` keeps the domain message intact for the caller
        assert_eq!(
            err.to_string(),
            "insufficient stock: available 3, requested 5"
        );
    }

    #[test]
    fn test_helper_constructors() {
        let err = DbError::not_found("Product", "p-1");
        assert_eq!(err.to_string(), "Product not found: p-1");

        let err = DbError::duplicate("code", "PRD-001");
        assert_eq!(err.to_string(), "duplicate code: 'PRD-001' already exists");
    }
}
