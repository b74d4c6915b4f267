//! # Schema Migrations
//!
//! Idempotent schema creation and first-open seed data.
//!
//! ## How This Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Bootstrap Process                            │
//! │                                                                         │
//! │  StoreManager::connect(path)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  run_migrations(pool)                                                   │
//! │       │                                                                 │
//! │       ├── CREATE TABLE IF NOT EXISTS categories ...                     │
//! │       ├── CREATE TABLE IF NOT EXISTS products ...                       │
//! │       ├── CREATE TABLE IF NOT EXISTS stock_movements ...                │
//! │       └── CREATE INDEX IF NOT EXISTS ...                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  seed_default_categories(pool)                                          │
//! │       │                                                                 │
//! │       ├── Store already has categories? → skip (never reseed)           │
//! │       └── Empty store? → insert the default category set                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every statement is written to be safe against a store that already has
//! the schema, so the whole bootstrap can run on every open.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Schema DDL, applied in order on every open.
///
/// Constraints enforced at the storage boundary:
/// - `categories.name` and `products.code` are UNIQUE
/// - foreign keys are required (no orphaned products or movements)
/// - `stock_movements.kind` is a closed set, `quantity` strictly positive
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL UNIQUE,
        color       TEXT NOT NULL DEFAULT '#6B7280',
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id             TEXT PRIMARY KEY,
        code           TEXT NOT NULL UNIQUE,
        name           TEXT NOT NULL,
        category_id    TEXT NOT NULL REFERENCES categories(id),
        unit           TEXT NOT NULL,
        critical_limit INTEGER NOT NULL DEFAULT 0 CHECK (critical_limit >= 0),
        price_cents    INTEGER NOT NULL DEFAULT 0 CHECK (price_cents >= 0),
        current_stock  INTEGER NOT NULL DEFAULT 0 CHECK (current_stock >= 0),
        created_at     TEXT NOT NULL,
        updated_at     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_movements (
        id          TEXT PRIMARY KEY,
        product_id  TEXT NOT NULL REFERENCES products(id),
        kind        TEXT NOT NULL CHECK (kind IN ('IN', 'OUT')),
        quantity    INTEGER NOT NULL CHECK (quantity > 0),
        date        TEXT NOT NULL,
        note        TEXT NOT NULL DEFAULT '',
        created_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_name ON products(name)",
    "CREATE INDEX IF NOT EXISTS idx_movements_product ON stock_movements(product_id)",
    "CREATE INDEX IF NOT EXISTS idx_movements_date ON stock_movements(date)",
];

/// Default categories seeded into a brand-new store so the UI has a
/// non-empty starting point.
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Genel", "#6B7280"),
    ("Elektronik", "#3B82F6"),
    ("Yedek Parça", "#EF4444"),
    ("Malzeme", "#10B981"),
    ("Kimyasal", "#F59E0B"),
    ("El Aletleri", "#8B5CF6"),
];

/// Runs all schema statements.
///
/// ## Safety
/// - Idempotent: safe to run multiple times against the same file
/// - Ordered: parent tables before children
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(statements = SCHEMA.len(), "Applying schema");

    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| DbError::MigrationFailed(e.to_string()))?;
    }

    Ok(())
}

/// Seeds the default category set into an empty store.
///
/// Seeding NEVER runs against a non-empty store: any existing category
/// (seeded or user-created) disables it permanently for that file.
pub async fn seed_default_categories(pool: &SqlitePool) -> DbResult<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        debug!(count, "Store already has categories, skipping seed");
        return Ok(());
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    for (name, color) in DEFAULT_CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (id, name, color, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(color)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!(
        categories = DEFAULT_CATEGORIES.len(),
        "Seeded default categories"
    );
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
