//! # Movement Repository - the Stock Ledger Engine
//!
//! Owns the only write path to `products.current_stock` and the movement
//! ledger it is derived from.
//!
//! ## The Two-Write Problem
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Creating a movement touches two rows                      │
//! │                                                                         │
//! │   INSERT INTO stock_movements (...)        ← the ledger entry           │
//! │   UPDATE products SET current_stock += Δ   ← the cached aggregate       │
//! │                                                                         │
//! │   Both commit together or neither persists: they run inside one         │
//! │   SQLite transaction, and a failure after the first write rolls the     │
//! │   whole thing back. At most the pre-call state survives any failure.    │
//! │                                                                         │
//! │   The aggregate update is a GUARDED DELTA:                              │
//! │                                                                         │
//! │     UPDATE products                                                     │
//! │     SET    current_stock = current_stock + ?delta                       │
//! │     WHERE  id = ?product AND current_stock + ?delta >= 0               │
//! │                                                                         │
//! │   The sufficiency check and the write are one atomic statement, so      │
//! │   two racing OUT movements can never both pass the check against a      │
//! │   stale stock value. The loser reports InsufficientStock against the    │
//! │   stock the winner left behind.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never recomputes the aggregate by summing the ledger on the
//! write path; deltas keep writes O(1). [`MovementRepository::reconcile`]
//! is the read-only diagnostic that recomputes and compares.
//!
//! Movements are immutable: there is no update operation, by design.
//! Correcting a mistake means delete + recreate, which keeps the aggregate
//! provably consistent with ledger contents at every commit point.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveTime, TimeZone, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktrack_core::{
    validation, CoreError, Movement, MovementStats, NewMovement, StockReconciliation,
};

/// Repository for movement database operations (the ledger engine).
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

const MOVEMENT_COLUMNS: &str = "id, product_id, kind, quantity, date, note, created_at";

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Records a movement and applies its delta to the product aggregate.
    ///
    /// ## Preconditions
    /// * `quantity > 0` (`ValidationError` otherwise)
    /// * the product exists (`NotFound` otherwise)
    /// * for OUT: `current_stock >= quantity`, else `InsufficientStock`
    ///   carrying the exact available and requested amounts
    ///
    /// ## Returns
    /// The created movement with its assigned id, `date = now`, and
    /// creation timestamp.
    pub async fn create(&self, new: NewMovement) -> DbResult<Movement> {
        validation::validate_quantity(new.quantity).map_err(CoreError::from)?;

        debug!(
            product_id = %new.product_id,
            kind = %new.kind,
            quantity = new.quantity,
            "Creating movement"
        );

        let now = Utc::now();
        let delta = new.kind.signed_delta(new.quantity);

        let mut tx = self.pool.begin().await?;

        // The guarded delta goes first so the transaction starts as a
        // writer: racing ledger writes queue on the SQLite write lock and
        // each guard runs against committed state, not a stale snapshot.
        let updated = apply_stock_delta(&mut tx, &new.product_id, delta, now).await?;

        if updated == 0 {
            // Guard refused: the product is missing, or an OUT asked for
            // more than is available. Dropping the transaction rolls back.
            return match current_stock(&mut tx, &new.product_id).await? {
                None => Err(DbError::not_found("Product", &new.product_id)),
                Some(available) => Err(CoreError::InsufficientStock {
                    available,
                    requested: new.quantity,
                }
                .into()),
            };
        }

        let movement = Movement {
            id: Uuid::new_v4().to_string(),
            product_id: new.product_id,
            kind: new.kind,
            quantity: new.quantity,
            date: now,
            note: new.note,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO stock_movements (id, product_id, kind, quantity, date, note, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&movement.id)
        .bind(&movement.product_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(movement.date)
        .bind(&movement.note)
        .bind(movement.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(movement)
    }

    /// Deletes a movement, reversing its effect on the product aggregate.
    ///
    /// The reversal is the opposite delta: subtract the quantity for an IN,
    /// add it back for an OUT. If the reversal would drive the stock below
    /// zero (an IN that later OUTs already consumed), the operation fails
    /// with `NegativeStockGuard` and performs no writes at all.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting movement");

        let mut tx = self.pool.begin().await?;

        let movement = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Movement", id))?;

        let reversal = -movement.kind.signed_delta(movement.quantity);
        let now = Utc::now();

        let updated = apply_stock_delta(&mut tx, &movement.product_id, reversal, now).await?;

        if updated == 0 {
            // The product row always exists while its movements do; the
            // guard refused because the reversal would underflow.
            let current = current_stock(&mut tx, &movement.product_id)
                .await?
                .unwrap_or(0);
            return Err(CoreError::NegativeStockGuard {
                current,
                adjustment: reversal,
            }
            .into());
        }

        sqlx::query("DELETE FROM stock_movements WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Gets a movement by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Movement>> {
        let movement = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(movement)
    }

    /// Lists all movements, newest first.
    pub async fn list(&self) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists a product's movement history, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements \
             WHERE product_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Counts movement rows.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Computes movement statistics from the ledger at query time.
    ///
    /// "Today" means the movement's `date` falls inside the current local
    /// calendar day. Nothing here reads the cached stock field, and nothing
    /// is cached beyond the request.
    pub async fn stats(&self) -> DbResult<MovementStats> {
        let (today_start, today_end) = local_day_bounds();

        let total_in = self.sum_quantity("IN", None).await?;
        let total_out = self.sum_quantity("OUT", None).await?;
        let today_in = self.sum_quantity("IN", Some((today_start, today_end))).await?;
        let today_out = self
            .sum_quantity("OUT", Some((today_start, today_end)))
            .await?;
        let movement_count = self.count().await?;

        Ok(MovementStats {
            total_in,
            total_out,
            today_in,
            today_out,
            movement_count,
        })
    }

    async fn sum_quantity(
        &self,
        kind: &str,
        window: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> DbResult<i64> {
        let total: i64 = match window {
            None => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(quantity), 0) FROM stock_movements WHERE kind = ?1",
                )
                .bind(kind)
                .fetch_one(&self.pool)
                .await?
            }
            Some((start, end)) => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(quantity), 0) FROM stock_movements \
                     WHERE kind = ?1 AND date >= ?2 AND date < ?3",
                )
                .bind(kind)
                .bind(start)
                .bind(end)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(total)
    }

    /// Recomputes a product's aggregate from the ledger and reports it next
    /// to the cached value.
    ///
    /// Read-only diagnostic; the write path never reconciles.
    pub async fn reconcile(&self, product_id: &str) -> DbResult<StockReconciliation> {
        let cached: Option<i64> =
            sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        let cached = cached.ok_or_else(|| DbError::not_found("Product", product_id))?;

        let computed: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(CASE kind WHEN 'IN' THEN quantity ELSE -quantity END), 0) \
             FROM stock_movements WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(StockReconciliation {
            product_id: product_id.to_string(),
            cached,
            computed,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Applies a signed delta to a product's cached stock, refusing to take it
/// below zero. Returns the number of rows updated: 0 means the product is
/// missing or the guard refused.
async fn apply_stock_delta(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<u64> {
    let result = sqlx::query(
        "UPDATE products \
         SET current_stock = current_stock + ?2, updated_at = ?3 \
         WHERE id = ?1 AND current_stock + ?2 >= 0",
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected())
}

/// Reads a product's cached stock inside the current transaction.
async fn current_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(stock)
}

/// Bounds of the current local calendar day as UTC instants.
fn local_day_bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = Local::now().date_naive().and_time(NaiveTime::MIN);
    let start = match Local.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST jump; read the naive time as UTC
        LocalResult::None => midnight.and_utc(),
    };

    (start, start + Duration::days(1))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stocktrack_core::{MovementType, NewProduct, Product};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory().seed_defaults(false))
            .await
            .unwrap()
    }

    async fn test_product(db: &Database) -> Product {
        let category = db.categories().insert_new("Test", "").await.unwrap();
        db.products()
            .insert(NewProduct {
                code: "PRD-001".to_string(),
                name: "Test product".to_string(),
                category_id: category.id,
                unit: "adet".to_string(),
                critical_limit: 5,
                price_cents: 250,
            })
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, product_id: &str) -> i64 {
        db.products()
            .get_by_id(product_id)
            .await
            .unwrap()
            .unwrap()
            .current_stock
    }

    async fn assert_consistent(db: &Database, product_id: &str) {
        let reconciliation = db.movements().reconcile(product_id).await.unwrap();
        assert!(
            reconciliation.is_consistent(),
            "cached {} != ledger sum {}",
            reconciliation.cached,
            reconciliation.computed
        );
    }

    fn movement(product_id: &str, kind: MovementType, quantity: i64) -> NewMovement {
        NewMovement {
            product_id: product_id.to_string(),
            kind,
            quantity,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_in_movement_increases_stock() {
        let db = test_db().await;
        let product = test_product(&db).await;

        let created = db
            .movements()
            .create(NewMovement {
                product_id: product.id.clone(),
                kind: MovementType::In,
                quantity: 10,
                note: "initial receipt".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.kind, MovementType::In);
        assert_eq!(created.quantity, 10);
        assert_eq!(created.note, "initial receipt");
        assert!(!created.id.is_empty());

        assert_eq!(stock_of(&db, &product.id).await, 10);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_out_movement_decreases_stock() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        movements.create(movement(&product.id, MovementType::In, 10)).await.unwrap();
        movements.create(movement(&product.id, MovementType::Out, 4)).await.unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 6);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_out_of_entire_stock_reaches_exactly_zero() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        movements.create(movement(&product.id, MovementType::In, 10)).await.unwrap();
        movements.create(movement(&product.id, MovementType::Out, 10)).await.unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 0);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_out_exceeding_stock_fails_and_changes_nothing() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        movements.create(movement(&product.id, MovementType::In, 10)).await.unwrap();

        let err = movements
            .create(movement(&product.id, MovementType::Out, 11))
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
            }) => {
                assert_eq!(available, 10);
                assert_eq!(requested, 11);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // No partial state: neither the aggregate nor the ledger moved
        assert_eq!(stock_of(&db, &product.id).await, 10);
        assert_eq!(movements.count().await.unwrap(), 1);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_create_rejects_non_positive_quantity() {
        let db = test_db().await;
        let product = test_product(&db).await;

        for quantity in [0, -3] {
            let err = db
                .movements()
                .create(movement(&product.id, MovementType::In, quantity))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                DbError::Domain(CoreError::Validation(_))
            ));
        }

        assert_eq!(db.movements().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_for_missing_product() {
        let db = test_db().await;

        let err = db
            .movements()
            .create(movement("no-such-product", MovementType::In, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_out_movement_restores_stock() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        movements.create(movement(&product.id, MovementType::In, 10)).await.unwrap();
        let out = movements
            .create(movement(&product.id, MovementType::Out, 4))
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product.id).await, 6);

        movements.delete(&out.id).await.unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 10);
        assert!(movements.get_by_id(&out.id).await.unwrap().is_none());
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_delete_consumed_in_movement_hits_the_guard() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        // Stock 0 → IN 10 → stock 10 → OUT 4 → stock 6.
        // Deleting the IN would need -10 against a stock of 6.
        let initial_in = movements
            .create(movement(&product.id, MovementType::In, 10))
            .await
            .unwrap();
        movements.create(movement(&product.id, MovementType::Out, 4)).await.unwrap();
        assert_eq!(stock_of(&db, &product.id).await, 6);

        let err = movements.delete(&initial_in.id).await.unwrap_err();
        match err {
            DbError::Domain(CoreError::NegativeStockGuard {
                current,
                adjustment,
            }) => {
                assert_eq!(current, 6);
                assert_eq!(adjustment, -10);
            }
            other => panic!("expected NegativeStockGuard, got {other:?}"),
        }

        // Nothing changed: the movement survives and stock remains 6
        assert_eq!(stock_of(&db, &product.id).await, 6);
        assert!(movements.get_by_id(&initial_in.id).await.unwrap().is_some());
        assert_eq!(movements.count().await.unwrap(), 2);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_delete_in_movement_down_to_exactly_zero_succeeds() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        let receipt = movements
            .create(movement(&product.id, MovementType::In, 10))
            .await
            .unwrap();

        movements.delete(&receipt.id).await.unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 0);
        assert_eq!(movements.count().await.unwrap(), 0);
        assert_consistent(&db, &product.id).await;
    }

    #[tokio::test]
    async fn test_delete_missing_movement() {
        let db = test_db().await;

        let err = db.movements().delete("no-such-movement").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        let first = movements.create(movement(&product.id, MovementType::In, 1)).await.unwrap();
        let second = movements.create(movement(&product.id, MovementType::In, 2)).await.unwrap();
        let third = movements.create(movement(&product.id, MovementType::Out, 1)).await.unwrap();

        let history = movements.list_for_product(&product.id).await.unwrap();
        let ids: Vec<String> = history.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);

        assert_eq!(movements.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_movement_keeps_date_and_created_at() {
        let db = test_db().await;
        let product = test_product(&db).await;

        let created = db
            .movements()
            .create(movement(&product.id, MovementType::In, 1))
            .await
            .unwrap();

        let fetched = db.movements().get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.date, created.date);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_stats_totals_and_today() {
        let db = test_db().await;
        let product = test_product(&db).await;
        let movements = db.movements();

        movements.create(movement(&product.id, MovementType::In, 10)).await.unwrap();
        movements.create(movement(&product.id, MovementType::In, 5)).await.unwrap();
        movements.create(movement(&product.id, MovementType::Out, 3)).await.unwrap();

        let stats = movements.stats().await.unwrap();
        assert_eq!(
            stats,
            MovementStats {
                total_in: 15,
                total_out: 3,
                // All rows were stamped moments ago, inside the current day
                today_in: 15,
                today_out: 3,
                movement_count: 3,
            }
        );
    }

    #[tokio::test]
    async fn test_stats_on_empty_ledger() {
        let db = test_db().await;

        let stats = db.movements().stats().await.unwrap();
        assert_eq!(stats, MovementStats::default());
    }

    #[tokio::test]
    async fn test_reconcile_missing_product() {
        let db = test_db().await;

        let err = db.movements().reconcile("no-such-product").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_out_movements_cannot_overdraw() {
        // File-backed store with a real pool: the two writers race on the
        // SQLite write lock instead of sharing one connection.
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("race.db")))
            .await
            .unwrap();
        let product = test_product(&db).await;

        db.movements()
            .create(movement(&product.id, MovementType::In, 10))
            .await
            .unwrap();

        // Two OUT 7s against a stock of 10: only one can fit
        let task = |db: Database, product_id: String| {
            tokio::spawn(async move {
                db.movements()
                    .create(movement(&product_id, MovementType::Out, 7))
                    .await
            })
        };
        let a = task(db.clone(), product.id.clone());
        let b = task(db.clone(), product.id.clone());

        let results = [a.await.unwrap(), b.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one OUT may succeed");

        let loser = results
            .into_iter()
            .find_map(Result::err)
            .expect("one OUT must fail");
        match loser {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
            }) => {
                // The loser checked against the stock the winner left behind
                assert_eq!(available, 3);
                assert_eq!(requested, 7);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        assert_eq!(stock_of(&db, &product.id).await, 3);
        assert_consistent(&db, &product.id).await;
    }
}
