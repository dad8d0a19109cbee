//! # Order Repository
//!
//! Orders and their lines.
//!
//! ## Persistence Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_by_id(id)  → orders row + order_lines rows (by position)           │
//! │                   → one Order aggregate with Vec<OrderLine>             │
//! │                                                                         │
//! │  insert(order)  → orders row + every line                               │
//! │                                                                         │
//! │  save(order)    → UPDATE orders header                                  │
//! │                   DELETE lines no longer in order.lines                 │
//! │                   UPSERT every remaining line (position = vec index)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting an order cascades to its lines (`ON DELETE CASCADE`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use tracing::debug;

use cafe_core::{Order, OrderLine, OrderStatus, OrderType, PaymentMethod};

use super::{decimal_text, parse_money};
use crate::error::{DbError, DbResult};

/// Default page size for [`OrderRepository::list`].
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Largest page [`OrderRepository::list`] will return.
pub const MAX_PAGE_SIZE: u32 = 200;

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    table_id: Option<String>,
    staff_id: String,
    customer_id: Option<String>,
    order_type: OrderType,
    status: OrderStatus,
    subtotal: String,
    discount_amount: String,
    total_amount: String,
    voucher_code: Option<String>,
    payment_method: Option<PaymentMethod>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> DbResult<Order> {
        Ok(Order {
            subtotal: parse_money("orders.subtotal", &self.subtotal)?,
            discount_amount: parse_money("orders.discount_amount", &self.discount_amount)?,
            total_amount: parse_money("orders.total_amount", &self.total_amount)?,
            id: self.id,
            table_id: self.table_id,
            staff_id: self.staff_id,
            customer_id: self.customer_id,
            order_type: self.order_type,
            status: self.status,
            voucher_code: self.voucher_code,
            payment_method: self.payment_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
            lines,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = DbError;

    fn try_from(row: OrderLineRow) -> DbResult<Self> {
        Ok(OrderLine {
            unit_price: parse_money("order_lines.unit_price", &row.unit_price)?,
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT
        id, table_id, staff_id, customer_id, order_type, status,
        subtotal, discount_amount, total_amount, voucher_code, payment_method,
        created_at, updated_at, paid_at
    FROM orders
"#;

// =============================================================================
// Filter
// =============================================================================

/// Criteria for [`OrderRepository::list`].
///
/// The created-at range is half-open: `created_from <= created_at < created_to`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl OrderFilter {
    pub fn with_status(status: OrderStatus) -> Self {
        OrderFilter {
            status: Some(status),
            ..Default::default()
        }
    }

    fn page_size(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders.
pub struct OrderRepository<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> OrderRepository<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        OrderRepository { conn }
    }

    /// Gets an order with all its lines.
    pub async fn get_by_id(&mut self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(&format!("{SELECT_ORDER} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        match row {
            Some(row) => {
                let lines = self.get_lines(&row.id).await?;
                row.into_order(lines).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Gets the lines of an order, in display order.
    pub async fn get_lines(&mut self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows: Vec<OrderLineRow> = sqlx::query_as(
            r#"
            SELECT id, product_id, product_name, quantity, unit_price, note, created_at
            FROM order_lines
            WHERE order_id = ?1
            ORDER BY position, created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *self.conn)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    /// Gets the PENDING order on a table, if any.
    pub async fn pending_for_table(&mut self, table_id: &str) -> DbResult<Option<Order>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM orders WHERE table_id = ?1 AND status = 'PENDING' LIMIT 1",
        )
        .bind(table_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        match id {
            Some(id) => self.get_by_id(&id).await,
            None => Ok(None),
        }
    }

    /// Counts PENDING orders on a table, ignoring `excluding_order_id`.
    pub async fn count_other_pending(
        &mut self,
        table_id: &str,
        excluding_order_id: &str,
    ) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE table_id = ?1 AND status = 'PENDING' AND id != ?2",
        )
        .bind(table_id)
        .bind(excluding_order_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    /// Lists orders matching `filter`, newest first.
    pub async fn list(&mut self, filter: &OrderFilter) -> DbResult<Vec<Order>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_ORDER);
        qb.push(" WHERE 1 = 1");

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.created_from {
            qb.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = filter.created_to {
            qb.push(" AND created_at < ").push_bind(to);
        }

        qb.push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(i64::from(filter.page_size()))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset.unwrap_or(0)));

        debug!(?filter, "Listing orders");

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(&mut *self.conn).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.get_lines(&row.id).await?;
            orders.push(row.into_order(lines)?);
        }

        Ok(orders)
    }

    /// Inserts a new order and its lines.
    ///
    /// A second PENDING order on the same table violates
    /// `ux_orders_pending_table` and comes back as
    /// [`DbError::UniqueViolation`].
    pub async fn insert(&mut self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, order_type = %order.order_type, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, table_id, staff_id, customer_id, order_type, status,
                subtotal, discount_amount, total_amount, voucher_code, payment_method,
                created_at, updated_at, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&order.id)
        .bind(&order.table_id)
        .bind(&order.staff_id)
        .bind(&order.customer_id)
        .bind(order.order_type)
        .bind(order.status)
        .bind(decimal_text(order.subtotal.amount()))
        .bind(decimal_text(order.discount_amount.amount()))
        .bind(decimal_text(order.total_amount.amount()))
        .bind(&order.voucher_code)
        .bind(order.payment_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .execute(&mut *self.conn)
        .await?;

        self.upsert_lines(order).await
    }

    /// Persists the current state of an existing order.
    pub async fn save(&mut self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, status = %order.status, lines = order.lines.len(), "Saving order");

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?1,
                subtotal = ?2,
                discount_amount = ?3,
                total_amount = ?4,
                voucher_code = ?5,
                payment_method = ?6,
                updated_at = ?7,
                paid_at = ?8
            WHERE id = ?9
            "#,
        )
        .bind(order.status)
        .bind(decimal_text(order.subtotal.amount()))
        .bind(decimal_text(order.discount_amount.amount()))
        .bind(decimal_text(order.total_amount.amount()))
        .bind(&order.voucher_code)
        .bind(order.payment_method)
        .bind(order.updated_at)
        .bind(order.paid_at)
        .bind(&order.id)
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        self.delete_removed_lines(order).await?;
        self.upsert_lines(order).await
    }

    async fn delete_removed_lines(&mut self, order: &Order) -> DbResult<()> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM order_lines WHERE order_id = ");
        qb.push_bind(order.id.as_str());

        if !order.lines.is_empty() {
            qb.push(" AND id NOT IN (");
            let mut separated = qb.separated(", ");
            for line in &order.lines {
                separated.push_bind(line.id.as_str());
            }
            separated.push_unseparated(")");
        }

        qb.build().execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn upsert_lines(&mut self, order: &Order) -> DbResult<()> {
        for (position, line) in order.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (
                    id, order_id, product_id, product_name, quantity, unit_price,
                    note, position, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    quantity = excluded.quantity,
                    note = excluded.note,
                    position = excluded.position
                "#,
            )
            .bind(&line.id)
            .bind(&order.id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(decimal_text(line.unit_price.amount()))
            .bind(&line.note)
            .bind(position as i64)
            .bind(line.created_at)
            .execute(&mut *self.conn)
            .await?;
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
