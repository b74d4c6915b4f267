//! # Error Types
//!
//! Domain-specific error types for stocktrack-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stocktrack-core errors (this file)                                     │
//! │  ├── CoreError        - Ledger rule violations                          │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  stocktrack-db errors (separate crate)                                  │
//! │  └── DbError          - Storage operation failures                      │
//! │                                                                         │
//! │  stocktrack-app errors                                                  │
//! │  └── ApiError         - What the UI host sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → UI            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (amounts, counts, field names)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Ledger rule violations.
///
/// These errors represent the business invariants of the stock ledger.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An OUT movement asked for more than the product has.
    ///
    /// ## When This Occurs
    /// - Issuing quantity greater than `current_stock`
    /// - The second of two racing OUT movements, checked against the
    ///   stock value left by the first
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    /// Deleting a movement would drive the cached stock below zero.
    ///
    /// ## When This Occurs
    /// - Deleting an IN movement whose quantity later OUT movements
    ///   already consumed
    ///
    /// `adjustment` is the signed delta the deletion would have applied.
    #[error(
        "cannot delete movement: stock would drop below zero (current {current}, adjustment {adjustment})"
    )]
    NegativeStockGuard { current: i64, adjustment: i64 },

    /// Deletion blocked by dependent rows.
    ///
    /// ## When This Occurs
    /// - Deleting a category that products still reference
    /// - Deleting a product that still has movement rows
    ///
    /// `dependents` is the true dependent count at check time.
    #[error("cannot delete {entity}: {dependents} dependent record(s) exist")]
    ReferentialIntegrity { entity: String, dependents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any storage call runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. invalid UUID, malformed color).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed closed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value for a unique key (e.g. duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock: available 3, requested 5"
        );

        let err = CoreError::NegativeStockGuard {
            current: 6,
            adjustment: -10,
        };
        assert_eq!(
            err.to_string(),
            "cannot delete movement: stock would drop below zero (current 6, adjustment -10)"
        );

        let err = CoreError::ReferentialIntegrity {
            entity: "Category".to_string(),
            dependents: 2,
        };
        assert_eq!(
            err.to_string(),
            "cannot delete Category: 2 dependent record(s) exist"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "code".to_string(),
        };
        assert_eq!(err.to_string(), "code is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
