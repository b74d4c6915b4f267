//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD with the unique business code enforced at the storage boundary
//! - Low-stock listing (the read-side view over the cached aggregate)
//! - Deletion blocked while ledger rows exist
//!
//! ## The Aggregate Is Off-Limits Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products.current_stock is written by EXACTLY ONE place: the ledger     │
//! │  engine (MovementRepository), inside the movement transaction.          │
//! │                                                                         │
//! │  insert() → current_stock starts at 0                                   │
//! │  update() → touches every editable column EXCEPT current_stock          │
//! │  delete() → refused while movements exist, so no history is orphaned    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktrack_core::{validation, CoreError, NewProduct, Product};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, code, name, category_id, unit, critical_limit, \
                               price_cents, current_stock, created_at, updated_at";

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    fn validate(input: &NewProduct) -> DbResult<()> {
        validation::validate_code(&input.code).map_err(CoreError::from)?;
        validation::validate_name(&input.name).map_err(CoreError::from)?;
        validation::validate_unit(&input.unit).map_err(CoreError::from)?;
        validation::validate_critical_limit(input.critical_limit).map_err(CoreError::from)?;
        validation::validate_price_cents(input.price_cents).map_err(CoreError::from)?;
        Ok(())
    }

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product. Stock always starts at zero; it only ever
    /// changes through the ledger.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - the code is already taken
    /// * `DbError::ForeignKeyViolation` - the category doesn't exist
    pub async fn insert(&self, input: NewProduct) -> DbResult<Product> {
        Self::validate(&input)?;

        debug!(code = %input.code, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            category_id: input.category_id,
            unit: input.unit.trim().to_string(),
            critical_limit: input.critical_limit,
            price_cents: input.price_cents,
            current_stock: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO products (id, code, name, category_id, unit, critical_limit, \
                                   price_cents, current_stock, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.category_id)
        .bind(&product.unit)
        .bind(product.critical_limit)
        .bind(product.price_cents)
        .bind(product.current_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &product.code),
            other => other,
        })?;

        Ok(product)
    }

    /// Updates a product's editable fields.
    ///
    /// `current_stock` is not editable: the column is absent from the SET
    /// list on purpose.
    pub async fn update(&self, id: &str, input: NewProduct) -> DbResult<Product> {
        Self::validate(&input)?;

        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
                code = ?2, \
                name = ?3, \
                category_id = ?4, \
                unit = ?5, \
                critical_limit = ?6, \
                price_cents = ?7, \
                updated_at = ?8 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(input.code.trim())
        .bind(input.name.trim())
        .bind(&input.category_id)
        .bind(input.unit.trim())
        .bind(input.critical_limit)
        .bind(input.price_cents)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", input.code.trim()),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Errors
    /// * `CoreError::ReferentialIntegrity` - ledger rows still reference the
    ///   product; the error carries the movement count
    /// * `DbError::NotFound` - no such product
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        let dependents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if dependents > 0 {
            return Err(CoreError::ReferentialIntegrity {
                entity: "Product".to_string(),
                dependents,
            }
            .into());
        }

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Lists products in the low-stock band: `0 < current_stock <= critical_limit`.
    ///
    /// Fully depleted items are deliberately excluded - zero stock is "out",
    /// not "low"; callers needing out-of-stock items query separately.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE current_stock > 0 AND current_stock <= critical_limit \
             ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stocktrack_core::{MovementType, NewMovement};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    async fn test_category(db: &Database) -> String {
        db.categories()
            .insert_new("Test", "")
            .await
            .unwrap()
            .id
    }

    fn input(code: &str, category_id: &str) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: format!("Product {code}"),
            category_id: category_id.to_string(),
            unit: "adet".to_string(),
            critical_limit: 5,
            price_cents: 250,
        }
    }

    #[tokio::test]
    async fn test_insert_starts_at_zero_stock() {
        let db = test_db().await;
        let category_id = test_category(&db).await;

        let product = db.products().insert(input("PRD-001", &category_id)).await.unwrap();
        assert_eq!(product.current_stock, 0);

        let fetched = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_stock, 0);
        assert_eq!(fetched.code, "PRD-001");

        let by_code = db.products().get_by_code("PRD-001").await.unwrap().unwrap();
        assert_eq!(by_code.id, product.id);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = test_db().await;
        let category_id = test_category(&db).await;

        db.products().insert(input("PRD-001", &category_id)).await.unwrap();
        let err = db.products().insert(input("PRD-001", &category_id)).await.unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_missing_category_rejected() {
        let db = test_db().await;

        let err = db
            .products()
            .insert(input("PRD-001", "no-such-category"))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let db = test_db().await;
        let category_id = test_category(&db).await;

        let mut bad = input("", &category_id);
        bad.code = String::new();
        assert!(matches!(
            db.products().insert(bad).await.unwrap_err(),
            DbError::Domain(CoreError::Validation(_))
        ));

        let mut bad = input("PRD-002", &category_id);
        bad.price_cents = -1;
        assert!(matches!(
            db.products().insert(bad).await.unwrap_err(),
            DbError::Domain(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_never_touches_stock() {
        let db = test_db().await;
        let category_id = test_category(&db).await;

        let product = db.products().insert(input("PRD-001", &category_id)).await.unwrap();

        db.movements()
            .create(NewMovement {
                product_id: product.id.clone(),
                kind: MovementType::In,
                quantity: 7,
                note: String::new(),
            })
            .await
            .unwrap();

        let mut changed = input("PRD-001-B", &category_id);
        changed.price_cents = 999;
        let updated = db.products().update(&product.id, changed).await.unwrap();

        assert_eq!(updated.code, "PRD-001-B");
        assert_eq!(updated.price_cents, 999);
        // The aggregate survives every product edit
        assert_eq!(updated.current_stock, 7);
    }

    #[tokio::test]
    async fn test_delete_blocked_while_movements_exist() {
        let db = test_db().await;
        let category_id = test_category(&db).await;

        let product = db.products().insert(input("PRD-001", &category_id)).await.unwrap();
        let movement = db
            .movements()
            .create(NewMovement {
                product_id: product.id.clone(),
                kind: MovementType::In,
                quantity: 1,
                note: String::new(),
            })
            .await
            .unwrap();

        let err = db.products().delete(&product.id).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::ReferentialIntegrity { entity, dependents }) => {
                assert_eq!(entity, "Product");
                assert_eq!(dependents, 1);
            }
            other => panic!("expected ReferentialIntegrity, got {other:?}"),
        }

        // Clearing the ledger unblocks the delete
        db.movements().delete(&movement.id).await.unwrap();
        db.products().delete(&product.id).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_low_stock_band() {
        let db = test_db().await;
        let category_id = test_category(&db).await;
        let products = db.products();
        let movements = db.movements();

        // critical_limit is 5 for all of these
        let depleted = products.insert(input("PRD-OUT", &category_id)).await.unwrap();
        let at_limit = products.insert(input("PRD-LOW", &category_id)).await.unwrap();
        let healthy = products.insert(input("PRD-OK", &category_id)).await.unwrap();

        for (product, quantity) in [(&at_limit, 5), (&healthy, 6)] {
            movements
                .create(NewMovement {
                    product_id: product.id.clone(),
                    kind: MovementType::In,
                    quantity,
                    note: String::new(),
                })
                .await
                .unwrap();
        }

        let low: Vec<String> = products
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        assert_eq!(low, vec![at_limit.id.clone()]);
        assert!(!low.contains(&depleted.id), "zero stock is out, not low");
        assert!(!low.contains(&healthy.id));
    }
}
