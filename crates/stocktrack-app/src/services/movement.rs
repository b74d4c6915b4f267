//! # Movement Service
//!
//! The four ledger operations exposed to the UI host:
//! create, delete, list, stats. The movement kind crosses the boundary as a
//! string tag and is parsed into the closed enum before anything else runs.

use std::sync::Arc;

use tracing::info;

use stocktrack_core::{Movement, MovementStats, MovementType, NewMovement};
use stocktrack_db::StoreManager;

use crate::error::ApiError;

/// Service for stock movement operations.
#[derive(Debug, Clone)]
pub struct MovementService {
    manager: Arc<StoreManager>,
}

impl MovementService {
    /// Creates a new movement service over the shared store manager.
    pub fn new(manager: Arc<StoreManager>) -> Self {
        MovementService { manager }
    }

    /// Records a movement against a product.
    ///
    /// ## Errors (by code)
    /// * `VALIDATION_ERROR` - bad kind tag or non-positive quantity
    /// * `NOT_FOUND` - unknown product
    /// * `INSUFFICIENT_STOCK` - OUT exceeds the current stock
    /// * `NOT_CONNECTED` - no store open
    pub async fn create(
        &self,
        product_id: &str,
        kind: &str,
        quantity: i64,
        note: &str,
    ) -> Result<Movement, ApiError> {
        let kind: MovementType = kind.parse()?;
        let db = self.manager.handle().await?;

        let movement = db
            .movements()
            .create(NewMovement {
                product_id: product_id.to_string(),
                kind,
                quantity,
                note: note.to_string(),
            })
            .await?;

        info!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            kind = %movement.kind,
            quantity = movement.quantity,
            "Movement recorded"
        );

        Ok(movement)
    }

    /// Deletes a movement, reversing its stock effect.
    ///
    /// ## Errors (by code)
    /// * `NOT_FOUND` - unknown movement
    /// * `NEGATIVE_STOCK_GUARD` - reversal would underflow the stock
    pub async fn delete(&self, movement_id: &str) -> Result<(), ApiError> {
        let db = self.manager.handle().await?;
        db.movements().delete(movement_id).await?;

        info!(movement_id = %movement_id, "Movement deleted");
        Ok(())
    }

    /// Gets a movement by ID.
    pub async fn get(&self, movement_id: &str) -> Result<Movement, ApiError> {
        let db = self.manager.handle().await?;
        db.movements()
            .get_by_id(movement_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Movement", movement_id))
    }

    /// Lists movements, newest first - all of them, or one product's history.
    pub async fn list(&self, product_id: Option<&str>) -> Result<Vec<Movement>, ApiError> {
        let db = self.manager.handle().await?;
        let movements = match product_id {
            Some(product_id) => db.movements().list_for_product(product_id).await?,
            None => db.movements().list().await?,
        };

        Ok(movements)
    }

    /// Movement statistics for the dashboard.
    pub async fn stats(&self) -> Result<MovementStats, ApiError> {
        let db = self.manager.handle().await?;
        Ok(db.movements().stats().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
