//! # Category Repository
//!
//! Database operations for categories.
//!
//! The interesting rule lives in [`CategoryRepository::delete`]: a category
//! cannot be removed while any product references it, and the error carries
//! the true dependent count so the UI can explain the refusal.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use stocktrack_core::{validation, Category, CoreError, DEFAULT_CATEGORY_COLOR};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

const CATEGORY_COLUMNS: &str = "id, name, color, created_at, updated_at";

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a category by its unique name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Creates a category.
    ///
    /// An empty color falls back to the default gray; a non-empty color must
    /// be a hex RGB string.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - a category with this name exists
    pub async fn insert_new(&self, name: &str, color: &str) -> DbResult<Category> {
        validation::validate_name(name).map_err(CoreError::from)?;

        let color = if color.trim().is_empty() {
            DEFAULT_CATEGORY_COLOR.to_string()
        } else {
            validation::validate_color(color).map_err(CoreError::from)?;
            color.trim().to_string()
        };

        debug!(name = %name, "Inserting category");

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            color,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO categories (id, name, color, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.color)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("name", &category.name),
            other => other,
        })?;

        Ok(category)
    }

    /// Updates a category's name and color.
    ///
    /// An empty color keeps the stored one.
    pub async fn update(&self, id: &str, name: &str, color: &str) -> DbResult<Category> {
        validation::validate_name(name).map_err(CoreError::from)?;

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id))?;

        let color = if color.trim().is_empty() {
            existing.color
        } else {
            validation::validate_color(color).map_err(CoreError::from)?;
            color.trim().to_string()
        };

        debug!(id = %id, "Updating category");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE categories SET name = ?2, color = ?3, updated_at = ?4 WHERE id = ?1",
        )
        .bind(id)
        .bind(name.trim())
        .bind(&color)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("name", name.trim()),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(Category {
            id: id.to_string(),
            name: name.trim().to_string(),
            color,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Deletes a category.
    ///
    /// ## Errors
    /// * `CoreError::ReferentialIntegrity` - products still reference the
    ///   category; the error carries the dependent count
    /// * `DbError::NotFound` - no such category
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let mut tx = self.pool.begin().await?;

        let dependents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if dependents > 0 {
            return Err(CoreError::ReferentialIntegrity {
                entity: "Category".to_string(),
                dependents,
            }
            .into());
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Counts categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
