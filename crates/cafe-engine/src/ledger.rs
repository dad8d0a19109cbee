//! # Inventory Ledger
//!
//! Stock movements inside the caller's transaction.
//!
//! ## Consumption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    apply_consumption(requirements)                      │
//! │                                                                         │
//! │  requirements: { milk: 0.4, beans: 0.036 }   (BTreeMap, id order)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  IngredientRepository::get_many  ← read current rows + versions         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  inventory::plan_consumption     ← pure check, first shortfall wins     │
//! │       │                                                                 │
//! │       ├── InsufficientStock ──► nothing written, caller rolls back      │
//! │       ▼                                                                 │
//! │  IngredientRepository::apply_changes                                    │
//! │       UPDATE … WHERE id = ? AND version = ?                             │
//! │       │                                                                 │
//! │       └── 0 rows ──► StaleWrite (retryable)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use std::collections::BTreeMap;
use tracing::{debug, info};

use cafe_core::inventory::{self, StockChange};
use cafe_core::Ingredient;
use cafe_db::IngredientRepository;

use crate::error::{EngineError, EngineResult};

/// Stock operations bound to one connection (normally an open transaction).
pub struct InventoryLedger<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> InventoryLedger<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        InventoryLedger { conn }
    }

    /// Deducts `requirements` from stock, or fails without writing.
    pub async fn apply_consumption(
        &mut self,
        requirements: &BTreeMap<String, Decimal>,
    ) -> EngineResult<Vec<StockChange>> {
        if requirements.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<&String> = requirements.keys().collect();
        let stock = IngredientRepository::new(&mut *self.conn).get_many(&ids).await?;

        let changes = inventory::plan_consumption(&stock, requirements)?;
        IngredientRepository::new(&mut *self.conn)
            .apply_changes(&changes)
            .await?;

        debug!(ingredients = changes.len(), "Stock consumed");
        Ok(changes)
    }

    /// Adds received goods to stock.
    pub async fn apply_receipt(
        &mut self,
        received: &BTreeMap<String, Decimal>,
    ) -> EngineResult<Vec<StockChange>> {
        let ids: Vec<&String> = received.keys().collect();
        let stock = IngredientRepository::new(&mut *self.conn).get_many(&ids).await?;

        let changes = inventory::plan_receipt(&stock, received)?;
        IngredientRepository::new(&mut *self.conn)
            .apply_changes(&changes)
            .await?;

        for change in &changes {
            info!(
                ingredient = %change.ingredient_name,
                received = %change.delta(),
                on_hand = %change.new_quantity,
                "Stock received"
            );
        }

        Ok(changes)
    }

    /// Sets an ingredient to an absolute quantity (stock-take).
    pub async fn adjust(
        &mut self,
        ingredient_id: &str,
        new_quantity: Decimal,
    ) -> EngineResult<StockChange> {
        let ingredient = IngredientRepository::new(&mut *self.conn)
            .get_by_id(ingredient_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Ingredient", ingredient_id))?;

        let change = inventory::plan_adjustment(&ingredient, new_quantity)?;
        IngredientRepository::new(&mut *self.conn)
            .apply_changes(std::slice::from_ref(&change))
            .await?;

        Ok(change)
    }

    /// Ingredients at or below their reorder level.
    pub async fn low_stock(&mut self) -> EngineResult<Vec<Ingredient>> {
        let all = IngredientRepository::new(&mut *self.conn).list_all().await?;
        Ok(all.into_iter().filter(Ingredient::is_low_stock).collect())
    }
}
