//! # Category Service
//!
//! Category CRUD for the UI host.

use std::sync::Arc;

use tracing::info;

use stocktrack_core::Category;
use stocktrack_db::StoreManager;

use crate::error::ApiError;

/// Service for category operations.
#[derive(Debug, Clone)]
pub struct CategoryService {
    manager: Arc<StoreManager>,
}

impl CategoryService {
    /// Creates a new category service over the shared store manager.
    pub fn new(manager: Arc<StoreManager>) -> Self {
        CategoryService { manager }
    }

    /// Lists all categories, sorted by name.
    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        let db = self.manager.handle().await?;
        Ok(db.categories().list().await?)
    }

    /// Gets a category by ID.
    pub async fn get(&self, category_id: &str) -> Result<Category, ApiError> {
        let db = self.manager.handle().await?;
        db.categories()
            .get_by_id(category_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Category", category_id))
    }

    /// Creates a category. An empty color gets the default gray.
    pub async fn create(&self, name: &str, color: &str) -> Result<Category, ApiError> {
        let db = self.manager.handle().await?;
        let category = db.categories().insert_new(name, color).await?;

        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Updates a category's name and color (empty color keeps the stored one).
    pub async fn update(
        &self,
        category_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Category, ApiError> {
        let db = self.manager.handle().await?;
        let category = db.categories().update(category_id, name, color).await?;

        info!(category_id = %category.id, "Category updated");
        Ok(category)
    }

    /// Deletes a category. Refused while products reference it.
    pub async fn delete(&self, category_id: &str) -> Result<(), ApiError> {
        let db = self.manager.handle().await?;
        db.categories().delete(category_id).await?;

        info!(category_id = %category_id, "Category deleted");
        Ok(())
    }

    /// Counts categories.
    pub async fn count(&self) -> Result<i64, ApiError> {
        let db = self.manager.handle().await?;
        Ok(db.categories().count().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
