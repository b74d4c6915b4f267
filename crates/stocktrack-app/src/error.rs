//! # API Error Type
//!
//! Unified error type for the service layer.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Stocktrack                             │
//! │                                                                         │
//! │  UI Host                      Rust Backend                              │
//! │  ───────                      ────────────                              │
//! │                                                                         │
//! │  invoke('create_movement')                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐   │
//! │  │  Service method                                                  │   │
//! │  │  Result<T, ApiError>                                             │   │
//! │  │         │                                                        │   │
//! │  │         ▼                                                        │   │
//! │  │  Ledger rule?  ── InsufficientStock / NegativeStockGuard ──┐     │   │
//! │  │  Storage?      ── DbError ─────────────────────────────────┤     │   │
//! │  │  Input?        ── ValidationError ─────────────────────────┴──►  │   │
//! │  │                                                    ApiError      │   │
//! │  └──────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  try { await invoke(...) } catch (e) {                                  │
//! │    // e.message = "insufficient stock: available 3, requested 5"        │
//! │    // e.code = "INSUFFICIENT_STOCK"                                     │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use stocktrack_core::{CoreError, ValidationError};
use stocktrack_db::DbError;

use crate::config::ConfigError;

/// API error returned from service methods.
///
/// ## Serialization
/// This is what the UI host receives when a call fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// One code per taxonomy entry, so the UI can branch without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No store is open
    NotConnected,

    /// Referenced product/movement/category absent
    NotFound,

    /// Input validation failed (empty field, bad kind tag, duplicate key)
    ValidationError,

    /// OUT movement exceeds current stock
    InsufficientStock,

    /// Movement deletion would underflow the stock aggregate
    NegativeStockGuard,

    /// Deletion blocked by dependent rows
    ReferentialIntegrity,

    /// Storage operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotConnected => ApiError::new(ErrorCode::NotConnected, "no store connected"),
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::ValidationError, err.to_string())
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "invalid reference")
            }
            DbError::Domain(core) => core.into(),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "store connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "store migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Store query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "store operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "store transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "store pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal store error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "store operation failed")
            }
        }
    }
}

/// Converts ledger rule violations to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::NegativeStockGuard { .. } => ErrorCode::NegativeStockGuard,
            CoreError::ReferentialIntegrity { .. } => ErrorCode::ReferentialIntegrity,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        ApiError::new(code, err.to_string())
    }
}

/// Converts input validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts config persistence errors to API errors.
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Config error: {}", err);
        ApiError::internal("configuration could not be saved")
    }
}

/// Converts filesystem errors (store file management) to API errors.
impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::internal(format!("file operation failed: {err}"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_mapping() {
        let err: ApiError = DbError::NotConnected.into();
        assert_eq!(err.code, ErrorCode::NotConnected);

        let err: ApiError = DbError::Domain(CoreError::InsufficientStock {
            available: 3,
            requested: 5,
        })
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.message, "insufficient stock: available 3, requested 5");

        let err: ApiError = DbError::Domain(CoreError::NegativeStockGuard {
            current: 6,
            adjustment: -10,
        })
        .into();
        assert_eq!(err.code, ErrorCode::NegativeStockGuard);

        let err: ApiError = DbError::Domain(CoreError::ReferentialIntegrity {
            entity: "Category".to_string(),
            dependents: 2,
        })
        .into();
        assert_eq!(err.code, ErrorCode::ReferentialIntegrity);

        let err: ApiError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_serializes_with_screaming_snake_code() {
        let err = ApiError::new(ErrorCode::NotConnected, "no store connected");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_CONNECTED");
        assert_eq!(json["message"], "no store connected");
    }
}
