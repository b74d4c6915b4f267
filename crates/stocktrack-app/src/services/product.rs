//! # Product Service
//!
//! Product CRUD for the UI host, plus the low-stock view.

use std::sync::Arc;

use tracing::info;

use stocktrack_core::{NewProduct, Product};
use stocktrack_db::StoreManager;

use crate::error::ApiError;

/// Service for product operations.
#[derive(Debug, Clone)]
pub struct ProductService {
    manager: Arc<StoreManager>,
}

impl ProductService {
    /// Creates a new product service over the shared store manager.
    pub fn new(manager: Arc<StoreManager>) -> Self {
        ProductService { manager }
    }

    /// Lists all products, sorted by name.
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let db = self.manager.handle().await?;
        Ok(db.products().list().await?)
    }

    /// Gets a product by ID.
    pub async fn get(&self, product_id: &str) -> Result<Product, ApiError> {
        let db = self.manager.handle().await?;
        db.products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", product_id))
    }

    /// Creates a product. Stock starts at zero and is only ever changed by
    /// movements.
    pub async fn create(&self, input: NewProduct) -> Result<Product, ApiError> {
        let db = self.manager.handle().await?;
        let product = db.products().insert(input).await?;

        info!(product_id = %product.id, code = %product.code, "Product created");
        Ok(product)
    }

    /// Updates a product's editable fields (never the stock aggregate).
    pub async fn update(&self, product_id: &str, input: NewProduct) -> Result<Product, ApiError> {
        let db = self.manager.handle().await?;
        let product = db.products().update(product_id, input).await?;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }

    /// Deletes a product. Refused while ledger rows exist.
    pub async fn delete(&self, product_id: &str) -> Result<(), ApiError> {
        let db = self.manager.handle().await?;
        db.products().delete(product_id).await?;

        info!(product_id = %product_id, "Product deleted");
        Ok(())
    }

    /// Products in the low-stock band (`0 < current_stock <= critical_limit`).
    pub async fn low_stock(&self) -> Result<Vec<Product>, ApiError> {
        let db = self.manager.handle().await?;
        Ok(db.products().low_stock().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use stocktrack_db::DbConfig;

    async fn connected_service() -> (ProductService, String) {
        let manager = Arc::new(StoreManager::new());
        manager
            .connect_with(DbConfig::in_memory().seed_defaults(false))
            .await
            .unwrap();

        let db = manager.handle().await.unwrap();
        let category = db.categories().insert_new("Test", "").await.unwrap();

        (ProductService::new(manager), category.id)
    }

    fn input(code: &str, category_id: &str) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: format!("Product {code}"),
            category_id: category_id.to_string(),
            unit: "adet".to_string(),
            critical_limit: 5,
            price_cents: 100,
        }
    }

    #[tokio::test]
    async fn test_crud_round_trip() {
        let (service, category_id) = connected_service().await;

        let created = service.create(input("PRD-001", &category_id)).await.unwrap();
        assert_eq!(created.current_stock, 0);

        let fetched = service.get(&created.id).await.unwrap();
        assert_eq!(fetched.code, "PRD-001");

        let mut change = input("PRD-001", &category_id);
        change.name = "Renamed".to_string();
        let updated = service.update(&created.id, change).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        service.delete(&created.id).await.unwrap();
        let err = service.get(&created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_code_maps_to_validation() {
        let (service, category_id) = connected_service().await;

        service.create(input("PRD-001", &category_id)).await.unwrap();
        let err = service.create(input("PRD-001", &category_id)).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_requires_connection() {
        let service = ProductService::new(Arc::new(StoreManager::new()));

        let err = service.list().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotConnected);
    }
}
