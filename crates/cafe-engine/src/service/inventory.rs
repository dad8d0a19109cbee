//! Goods receipt, stock-take and the low-stock report.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, info};

use cafe_core::inventory::StockChange;
use cafe_core::validation::validate_reason;
use cafe_core::{Ingredient, StaffContext};

use super::requests::{ReceivedItem, StockAdjustment};
use super::{commit, OrderService};
use crate::error::{EngineError, EngineResult};
use crate::ledger::InventoryLedger;

impl OrderService {
    /// Adds received goods to stock (purchase order completion).
    ///
    /// Lines for the same ingredient are summed. Every quantity must be
    /// positive.
    pub async fn receive_stock(
        &self,
        staff: &StaffContext,
        items: &[ReceivedItem],
    ) -> EngineResult<Vec<StockChange>> {
        debug!(staff = %staff.username, lines = items.len(), "receive_stock");

        if items.is_empty() {
            return Err(EngineError::invalid_argument("Goods receipt has no items"));
        }

        let mut received: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in items {
            *received.entry(item.ingredient_id.clone()).or_default() += item.quantity;
        }

        let received = &received;
        self.with_retry("receive_stock", move || async move {
            let mut tx = self.db.begin_write().await?;
            let changes = InventoryLedger::new(&mut tx).apply_receipt(received).await?;
            commit(tx).await?;
            Ok::<_, EngineError>(changes)
        })
        .await
    }

    /// Sets an ingredient to a counted quantity.
    pub async fn adjust_stock(
        &self,
        staff: &StaffContext,
        adjustment: &StockAdjustment,
    ) -> EngineResult<StockChange> {
        let reason = validate_reason(&adjustment.reason)?;

        let change = self
            .with_retry("adjust_stock", move || async move {
                let mut tx = self.db.begin_write().await?;
                let change = InventoryLedger::new(&mut tx)
                    .adjust(&adjustment.ingredient_id, adjustment.new_quantity)
                    .await?;
                commit(tx).await?;
                Ok::<_, EngineError>(change)
            })
            .await?;

        info!(
            ingredient = %change.ingredient_name,
            from = %change.previous_quantity,
            to = %change.new_quantity,
            reason = %reason,
            staff = %staff.username,
            "Stock adjusted"
        );

        Ok(change)
    }

    /// Ingredients at or below their reorder level.
    pub async fn low_stock(&self) -> EngineResult<Vec<Ingredient>> {
        let mut conn = self.db.acquire().await?;
        InventoryLedger::new(&mut conn).low_stock().await
    }
}
