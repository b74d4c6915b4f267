//! # Domain Types
//!
//! Core domain types used throughout Stocktrack.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │   │     Product     │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name (unique)  │   │  code (business)│   │  product_id (FK)│       │
//! │  │  color (hex)    │   │  current_stock  │   │  kind IN | OUT  │       │
//! │  └─────────────────┘   └─────────────────┘   │  quantity > 0   │       │
//! │                                              └─────────────────┘       │
//! │                                                                         │
//! │  current_stock is a CACHED AGGREGATE: it always equals                 │
//! │  Σ(IN quantities) − Σ(OUT quantities) over the product's surviving     │
//! │  movements. Only the ledger engine may write it.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business key where one exists: `Product.code`, `Category.name`

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Movement Type
// =============================================================================

/// Direction of a stock movement.
///
/// This is a closed set: a movement either brings stock IN (receipt) or
/// takes stock OUT (issue). Direction is carried by this tag, never by the
/// sign of the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Stock receipt: increases the product's current stock.
    In,
    /// Stock issue: decreases the product's current stock.
    Out,
}

impl MovementType {
    /// Returns the signed stock delta this movement applies for `quantity`.
    ///
    /// ## Example
    /// ```rust
    /// use stocktrack_core::MovementType;
    ///
    /// assert_eq!(MovementType::In.signed_delta(4), 4);
    /// assert_eq!(MovementType::Out.signed_delta(4), -4);
    /// ```
    #[inline]
    pub const fn signed_delta(self, quantity: i64) -> i64 {
        match self {
            MovementType::In => quantity,
            MovementType::Out => -quantity,
        }
    }

    /// The wire tag for this movement type (`"IN"` / `"OUT"`).
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the wire tag coming from the UI boundary.
///
/// Anything other than `IN` / `OUT` is rejected: the set is closed.
impl FromStr for MovementType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            _ => Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["IN".to_string(), "OUT".to_string()],
            }),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
///
/// Categories group products for display; the name is unique among
/// categories and acts as the business key. A category cannot be removed
/// while any product references it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, unique among categories.
    pub name: String,

    /// Display color as a hex RGB string (e.g. `#3B82F6`).
    pub color: String,

    /// When the category was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the category was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// An inventory item.
///
/// `current_stock` is a cached aggregate derived from the movement ledger.
/// It is not independently writable: only the ledger engine changes it, and
/// always in the same transaction as the movement row that justifies the
/// change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code (SKU-like external key), globally unique.
    pub code: String,

    /// Display name.
    pub name: String,

    /// Owning category (required foreign key).
    pub category_id: String,

    /// Unit of measure (e.g. "adet", "kg", "litre").
    pub unit: String,

    /// Critical stock threshold; at or below this (and above zero) the
    /// product counts as low stock.
    pub critical_limit: i64,

    /// Unit price in cents (smallest currency unit), never negative.
    pub price_cents: i64,

    /// Cached stock level, derived from the movement ledger.
    pub current_stock: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Total value of the stock on hand (`current_stock × price`).
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.price() * self.current_stock
    }

    /// Whether the product is low on stock.
    ///
    /// Zero stock is "out", not "low": the low-stock band is
    /// `0 < current_stock <= critical_limit`.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock > 0 && self.current_stock <= self.critical_limit
    }
}

// =============================================================================
// Movement
// =============================================================================

/// One stock movement: an immutable ledger entry.
///
/// Movements are created and deleted, never updated. Correcting a mistake
/// means delete + recreate, which keeps the cached aggregate provably
/// consistent with ledger contents at every commit point.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product this movement belongs to (required foreign key).
    pub product_id: String,

    /// Direction of the movement.
    pub kind: MovementType,

    /// Moved quantity, strictly positive.
    pub quantity: i64,

    /// Occurrence timestamp of the movement.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Free-text note.
    pub note: String,

    /// System time the ledger row was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a movement through the ledger engine.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMovement {
    pub product_id: String,
    pub kind: MovementType,
    pub quantity: i64,
    pub note: String,
}

/// Input for creating or updating a product.
///
/// `current_stock` is deliberately absent: the aggregate starts at zero and
/// only the ledger engine may change it afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category_id: String,
    pub unit: String,
    pub critical_limit: i64,
    pub price_cents: i64,
}

// =============================================================================
// Read-Side Views
// =============================================================================

/// Aggregated movement statistics, computed from the ledger at query time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MovementStats {
    /// Total quantity moved IN, all time.
    pub total_in: i64,

    /// Total quantity moved OUT, all time.
    pub total_out: i64,

    /// Quantity moved IN during the current local calendar day.
    pub today_in: i64,

    /// Quantity moved OUT during the current local calendar day.
    pub today_out: i64,

    /// Total number of movement rows.
    pub movement_count: i64,
}

/// Result of recomputing a product's aggregate from the ledger.
///
/// A read-only diagnostic: the write path never reconciles, it maintains
/// the invariant by construction.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReconciliation {
    pub product_id: String,

    /// The cached `current_stock` value on the product row.
    pub cached: i64,

    /// Σ(IN quantities) − Σ(OUT quantities) over surviving movements.
    pub computed: i64,
}

impl StockReconciliation {
    /// True when the cached aggregate matches the ledger.
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.cached == self.computed
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
