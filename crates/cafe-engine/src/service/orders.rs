//! Order creation, line items, vouchers, cancellation and queries.

use chrono::Utc;
use tracing::{debug, info};

use cafe_core::validation::{normalize_note, normalize_voucher_code};
use cafe_core::voucher::{self, VoucherCheck};
use cafe_core::{table, Money, Order, OrderType, Pricing, StaffContext};
use cafe_db::{
    CatalogRepository, CustomerRepository, OrderFilter, OrderRepository, TableRepository,
    VoucherRepository,
};

use super::requests::{AddItemRequest, CreateOrderRequest, OrderDetail, UpdateItemRequest};
use super::{
    attached_voucher, commit, load_order, load_pending_order, log_detached, require_staff,
    OrderService,
};
use crate::error::{EngineError, EngineResult};
use crate::sync;

impl OrderService {
    // =========================================================================
    // Create
    // =========================================================================

    /// Opens a new PENDING order.
    ///
    /// ## Checks
    /// - Staff, customer, table and every product must exist
    /// - A dine-in order needs a table
    /// - The table must be EMPTY with no PENDING order on it
    ///
    /// An initial voucher that does not qualify is dropped and reported in
    /// [`OrderDetail::detached_voucher`] instead of failing the request.
    pub async fn create_order(
        &self,
        staff: &StaffContext,
        request: CreateOrderRequest,
    ) -> EngineResult<OrderDetail> {
        debug!(
            staff = %staff.username,
            order_type = %request.order_type,
            items = request.items.len(),
            "create_order"
        );

        if request.order_type == OrderType::DineIn && request.table_id.is_none() {
            return Err(EngineError::invalid_argument("Dine-in orders require a table"));
        }

        let voucher_code = request
            .voucher_code
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(normalize_voucher_code)
            .transpose()?;

        let request = &request;
        let voucher_code = &voucher_code;
        let (order, detached) = self
            .with_retry("create_order", move || async move {
                let now = Utc::now();
                let mut tx = self.db.begin_write().await?;

                require_staff(&mut tx, staff).await?;

                if let Some(customer_id) = &request.customer_id {
                    CustomerRepository::new(&mut tx)
                        .get_by_id(customer_id)
                        .await?
                        .ok_or_else(|| EngineError::not_found("Customer", customer_id))?;
                }

                if let Some(table_id) = &request.table_id {
                    let cafe_table = TableRepository::new(&mut tx)
                        .get_by_id(table_id)
                        .await?
                        .ok_or_else(|| EngineError::not_found("Table", table_id))?;
                    let pending = OrderRepository::new(&mut tx)
                        .pending_for_table(table_id)
                        .await?;
                    table::check_available(&cafe_table, pending.as_ref().map(|o| o.id.as_str()))?;
                }

                let product_ids: Vec<String> =
                    request.items.iter().map(|i| i.product_id.clone()).collect();
                let products = CatalogRepository::new(&mut tx)
                    .get_products(&product_ids)
                    .await?;

                let mut order = Order::new(
                    request.order_type,
                    request.table_id.clone(),
                    &staff.staff_id,
                    request.customer_id.clone(),
                    now,
                );

                for item in &request.items {
                    let product = products
                        .get(&item.product_id)
                        .ok_or_else(|| EngineError::not_found("Product", &item.product_id))?;
                    let note = normalize_note(item.note.as_deref())?;
                    order.add_item(product, item.quantity, note, Pricing::at(now))?;
                }

                let voucher = match voucher_code {
                    Some(code) => VoucherRepository::new(&mut tx).get_by_code(code).await?,
                    None => None,
                };
                order.voucher_code = voucher_code.clone();
                let totals = order.recalculate_totals(Pricing::new(voucher.as_ref(), now));

                OrderRepository::new(&mut tx).insert(&order).await?;

                if let Some(table_id) = &order.table_id {
                    sync::occupy_table(&mut tx, table_id).await?;
                }

                commit(tx).await?;
                Ok::<_, EngineError>((order, totals.detached_voucher))
            })
            .await?;

        log_detached(&order.id, detached.as_ref());
        info!(
            order_id = %order.id,
            order_type = %order.order_type,
            table_id = ?order.table_id,
            lines = order.lines.len(),
            total = %self.config.format_money(order.total_amount),
            "Order created"
        );

        Ok(OrderDetail::new(order).with_detached(detached))
    }

    // =========================================================================
    // Line items
    // =========================================================================

    /// Adds a product to a PENDING order, merging with an existing line for
    /// the same product.
    pub async fn add_item(
        &self,
        staff: &StaffContext,
        order_id: &str,
        request: AddItemRequest,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, product_id = %request.product_id, "add_item");

        let note = normalize_note(request.note.as_deref())?;
        let request = &request;
        let note = &note;

        self.with_retry("add_item", move || async move {
            let now = Utc::now();
            let mut tx = self.db.begin_write().await?;

            let mut order = load_pending_order(&mut tx, order_id).await?;
            let product = CatalogRepository::new(&mut tx)
                .get_product(&request.product_id)
                .await?
                .ok_or_else(|| EngineError::not_found("Product", &request.product_id))?;
            let voucher = attached_voucher(&mut tx, &order).await?;

            let totals = order.add_item(
                &product,
                request.quantity,
                note.clone(),
                Pricing::new(voucher.as_ref(), now),
            )?;

            OrderRepository::new(&mut tx).save(&order).await?;
            commit(tx).await?;

            log_detached(&order.id, totals.detached_voucher.as_ref());
            Ok::<_, EngineError>(OrderDetail::new(order).with_detached(totals.detached_voucher))
        })
        .await
    }

    /// Replaces the quantity and note of a line on a PENDING order.
    pub async fn update_item(
        &self,
        staff: &StaffContext,
        order_id: &str,
        line_id: &str,
        request: UpdateItemRequest,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, line_id = %line_id, "update_item");

        let note = normalize_note(request.note.as_deref())?;
        let quantity = request.quantity;
        let note = &note;

        self.with_retry("update_item", move || async move {
            let now = Utc::now();
            let mut tx = self.db.begin_write().await?;

            let mut order = load_pending_order(&mut tx, order_id).await?;
            let voucher = attached_voucher(&mut tx, &order).await?;

            let totals = order.update_item(
                line_id,
                quantity,
                note.clone(),
                Pricing::new(voucher.as_ref(), now),
            )?;

            OrderRepository::new(&mut tx).save(&order).await?;
            commit(tx).await?;

            log_detached(&order.id, totals.detached_voucher.as_ref());
            Ok::<_, EngineError>(OrderDetail::new(order).with_detached(totals.detached_voucher))
        })
        .await
    }

    /// Removes a line from a PENDING order.
    ///
    /// Removing the last line zeroes the totals and drops the voucher.
    pub async fn remove_item(
        &self,
        staff: &StaffContext,
        order_id: &str,
        line_id: &str,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, line_id = %line_id, "remove_item");

        self.with_retry("remove_item", move || async move {
            let now = Utc::now();
            let mut tx = self.db.begin_write().await?;

            let mut order = load_pending_order(&mut tx, order_id).await?;
            let voucher = attached_voucher(&mut tx, &order).await?;

            let totals = order.remove_item(line_id, Pricing::new(voucher.as_ref(), now))?;

            OrderRepository::new(&mut tx).save(&order).await?;
            commit(tx).await?;

            log_detached(&order.id, totals.detached_voucher.as_ref());
            Ok::<_, EngineError>(OrderDetail::new(order).with_detached(totals.detached_voucher))
        })
        .await
    }

    // =========================================================================
    // Vouchers
    // =========================================================================

    /// Attaches a voucher to a PENDING order.
    ///
    /// ## Errors
    /// - `NotFound` when no voucher has this code
    /// - `InvalidArgument` when it does not qualify (inactive, used up,
    ///   outside its window, order below minimum)
    pub async fn apply_voucher(
        &self,
        staff: &StaffContext,
        order_id: &str,
        code: &str,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, code = %code, "apply_voucher");

        let code = normalize_voucher_code(code)?;
        let code = code.as_str();

        let (order, totals) = self
            .with_retry("apply_voucher", move || async move {
                let now = Utc::now();
                let mut tx = self.db.begin_write().await?;

                let mut order = load_pending_order(&mut tx, order_id).await?;
                let voucher = VoucherRepository::new(&mut tx)
                    .get_by_code(code)
                    .await?
                    .ok_or_else(|| EngineError::not_found("Voucher", code))?;

                let totals = order.apply_voucher(&voucher, now)?;

                OrderRepository::new(&mut tx).save(&order).await?;
                commit(tx).await?;
                Ok::<_, EngineError>((order, totals))
            })
            .await?;

        info!(
            order_id = %order.id,
            code = %code,
            discount = %self.config.format_money(totals.discount),
            "Voucher applied"
        );

        Ok(OrderDetail::new(order))
    }

    /// Detaches the voucher from a PENDING order.
    ///
    /// ## Errors
    /// - `InvalidArgument` when the order has no voucher
    pub async fn remove_voucher(
        &self,
        staff: &StaffContext,
        order_id: &str,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, "remove_voucher");

        let (order, removed) = self
            .with_retry("remove_voucher", move || async move {
                let now = Utc::now();
                let mut tx = self.db.begin_write().await?;

                let mut order = load_pending_order(&mut tx, order_id).await?;
                let removed = order.voucher_code.clone();
                order.remove_voucher(now)?;

                OrderRepository::new(&mut tx).save(&order).await?;
                commit(tx).await?;
                Ok::<_, EngineError>((order, removed))
            })
            .await?;

        info!(order_id = %order.id, code = ?removed, "Voucher removed");

        Ok(OrderDetail::new(order))
    }

    /// Evaluates a voucher against an amount without touching any order.
    pub async fn check_voucher(&self, code: &str, order_amount: Money) -> EngineResult<VoucherCheck> {
        let code = normalize_voucher_code(code)?;
        let mut conn = self.db.acquire().await?;

        let voucher = VoucherRepository::new(&mut conn)
            .get_by_code(&code)
            .await?
            .ok_or_else(|| EngineError::not_found("Voucher", &code))?;

        Ok(voucher::evaluate(&voucher, order_amount, Utc::now()))
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    /// Cancels a PENDING order and frees its table.
    ///
    /// Stock and loyalty points are untouched.
    pub async fn cancel_order(
        &self,
        staff: &StaffContext,
        order_id: &str,
    ) -> EngineResult<OrderDetail> {
        debug!(staff = %staff.username, order_id = %order_id, "cancel_order");

        let order = self
            .with_retry("cancel_order", move || async move {
                let now = Utc::now();
                let mut tx = self.db.begin_write().await?;

                let mut order = load_pending_order(&mut tx, order_id).await?;
                order.mark_cancelled(now)?;

                OrderRepository::new(&mut tx).save(&order).await?;
                sync::release_table(&mut tx, &order).await?;
                commit(tx).await?;
                Ok::<_, EngineError>(order)
            })
            .await?;

        info!(order_id = %order.id, staff = %staff.username, "Order cancelled");

        Ok(OrderDetail::new(order))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets an order with its lines.
    pub async fn get_order(&self, order_id: &str) -> EngineResult<OrderDetail> {
        let mut conn = self.db.acquire().await?;
        load_order(&mut conn, order_id).await.map(OrderDetail::new)
    }

    /// Gets the PENDING order on a table, if any.
    pub async fn pending_order_for_table(
        &self,
        table_id: &str,
    ) -> EngineResult<Option<OrderDetail>> {
        let mut conn = self.db.acquire().await?;

        TableRepository::new(&mut conn)
            .get_by_id(table_id)
            .await?
            .ok_or_else(|| EngineError::not_found("Table", table_id))?;

        let order = OrderRepository::new(&mut conn)
            .pending_for_table(table_id)
            .await?;
        Ok(order.map(OrderDetail::new))
    }

    /// Lists orders by status and/or creation time, newest first.
    pub async fn list_orders(&self, filter: &OrderFilter) -> EngineResult<Vec<OrderDetail>> {
        let mut conn = self.db.acquire().await?;
        let orders = OrderRepository::new(&mut conn).list(filter).await?;
        Ok(orders.into_iter().map(OrderDetail::new).collect())
    }
}
