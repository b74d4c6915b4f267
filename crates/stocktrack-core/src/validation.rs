//! # Validation Module
//!
//! Input validation rules for Stocktrack.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI host                                                       │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service / ledger engine (Rust)                                │
//! │  └── THIS MODULE: domain rule validation                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storage (SQLite)                                              │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints                                                 │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code (the SKU-like business key).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use stocktrack_core::validation::validate_code;
///
/// assert!(validate_code("PRD-001").is_ok());
/// assert!(validate_code("").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a display name (product or category).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a unit-of-measure string.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 20 characters
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    let unit = unit.trim();

    if unit.is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if unit.len() > 20 {
        return Err(ValidationError::TooLong {
            field: "unit".to_string(),
            max: 20,
        });
    }

    Ok(())
}

/// Validates a category display color.
///
/// ## Rules
/// - Hex RGB string: `#` followed by exactly six hex digits
///
/// ## Example
/// ```rust
/// use stocktrack_core::validation::validate_color;
///
/// assert!(validate_color("#3B82F6").is_ok());
/// assert!(validate_color("blue").is_err());
/// ```
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let color = color.trim();

    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "color".to_string(),
            reason: "must be a hex RGB string like #6B7280".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement quantity.
///
/// ## Rules
/// - Must be strictly positive; direction is carried by the movement kind,
///   never by the sign of the quantity.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a critical stock threshold.
///
/// ## Rules
/// - Must be non-negative (zero disables the low-stock band)
pub fn validate_critical_limit(limit: i64) -> ValidationResult<()> {
    if limit < 0 {
        return Err(ValidationError::OutOfRange {
            field: "critical_limit".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (zero is allowed)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID identifier string.
///
/// ## Example
/// ```rust
/// use stocktrack_core::validation::validate_id;
///
/// assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_id("not-a-uuid").is_err());
/// ```
pub fn validate_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code() {
        assert!(validate_code("PRD-001").is_ok());
        assert!(validate_code("ABC123").is_ok());
        assert!(validate_code("part_1").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("M8 civata").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_unit() {
        assert!(validate_unit("adet").is_ok());
        assert!(validate_unit("kg").is_ok());
        assert!(validate_unit("").is_err());
        assert!(validate_unit(&"x".repeat(30)).is_err());
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#6B7280").is_ok());
        assert!(validate_color("#3b82f6").is_ok());

        assert!(validate_color("").is_err());
        assert!(validate_color("blue").is_err());
        assert!(validate_color("#FFF").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_critical_limit() {
        assert!(validate_critical_limit(0).is_ok());
        assert!(validate_critical_limit(50).is_ok());
        assert!(validate_critical_limit(-1).is_err());
    }

    #[test]
    fn test_validate_price_cents() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(1099).is_ok());
        assert!(validate_price_cents(-100).is_err());
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_id("").is_err());
        assert!(validate_id("not-a-uuid").is_err());
    }
}
