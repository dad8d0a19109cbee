//! Payment: stock consumption, status flip and the side effects that
//! follow it.

use chrono::Utc;
use tracing::{debug, error, info, warn};

use cafe_core::{recipe, PaymentMethod, StaffContext};
use cafe_db::{CatalogRepository, OrderRepository, VoucherRepository};

use super::requests::OrderDetail;
use super::{commit, load_pending_order, OrderService};
use crate::error::EngineResult;
use crate::ledger::InventoryLedger;
use crate::sync;

impl OrderService {
    /// Pays a PENDING order.
    ///
    /// `method` is matched case-insensitively against CASH, TRANSFER and
    /// CARD. The order is checked first, so an already closed order reports
    /// `InvalidState` whatever the method.
    ///
    /// ## Errors
    /// - `NotFound` when the order does not exist
    /// - `InvalidState` when the order is not PENDING
    /// - `InvalidArgument` for an unknown payment method (order untouched)
    /// - `InsufficientStock` when any ingredient runs short; nothing is
    ///   written and the order stays PENDING
    /// - `Conflict` when concurrent stock writes keep winning after
    ///   `max_retries` attempts
    pub async fn pay_order(
        &self,
        staff: &StaffContext,
        order_id: &str,
        method: &str,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, method = %method, "pay_order");

        self.with_retry("pay_order", move || self.pay_once(staff, order_id, method))
            .await
    }

    async fn pay_once(
        &self,
        staff: &StaffContext,
        order_id: &str,
        method: &str,
    ) -> EngineResult<OrderDetail> {
        let now = Utc::now();
        let mut tx = self.db.begin_write().await?;

        let mut order = load_pending_order(&mut tx, order_id).await?;
        let method: PaymentMethod = method.parse()?;

        // Stock
        let product_ids: Vec<String> = order.lines.iter().map(|l| l.product_id.clone()).collect();
        let recipes = CatalogRepository::new(&mut tx)
            .recipes_for(&product_ids)
            .await?;
        let expansion = recipe::expand(&order.lines, &recipes);
        for product_id in &expansion.products_without_recipe {
            warn!(order_id = %order.id, product_id = %product_id, "Product has no recipe, no stock deducted");
        }

        let changes = InventoryLedger::new(&mut tx)
            .apply_consumption(&expansion.requirements)
            .await?;

        // Status
        order.mark_paid(method, now)?;
        OrderRepository::new(&mut tx).save(&order).await?;

        if let Some(code) = order.voucher_code.as_deref() {
            match VoucherRepository::new(&mut tx).increment_usage(code).await {
                Ok(()) => debug!(code = %code, "Voucher usage recorded"),
                Err(e) => error!(order_id = %order.id, code = %code, error = %e, "Failed to record voucher usage"),
            }
        }

        sync::release_table(&mut tx, &order).await?;
        let points = sync::accrue_loyalty(&mut tx, &order, self.config.loyalty_unit).await?;

        commit(tx).await?;

        info!(
            order_id = %order.id,
            staff = %staff.username,
            method = %method,
            total = %self.config.format_money(order.total_amount),
            ingredients = changes.len(),
            "Order paid"
        );

        let mut detail = OrderDetail::new(order);
        detail.loyalty_points_earned = points;
        Ok(detail)
    }
}
