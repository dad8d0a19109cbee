//! # Table and Loyalty Synchronization
//!
//! Side effects of the order lifecycle on tables and customers, run in the
//! same transaction as the order change.
//!
//! ```text
//! create_order ──► occupy_table      EMPTY → SERVING
//! pay / cancel ──► release_table     SERVING → EMPTY (no other PENDING order)
//! pay          ──► accrue_loyalty    points = floor(total / loyalty_unit)
//! ```

use rust_decimal::Decimal;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use cafe_core::{loyalty, table, Order};
use cafe_db::{CustomerRepository, OrderRepository, TableRepository};

use crate::error::{EngineError, EngineResult};

/// Marks a table as serving once an order opens on it.
pub async fn occupy_table(conn: &mut SqliteConnection, table_id: &str) -> EngineResult<()> {
    let table = TableRepository::new(&mut *conn)
        .get_by_id(table_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Table", table_id))?;

    if let Some(next) = table::status_after_open(table.status) {
        TableRepository::new(&mut *conn)
            .set_status(&table.id, next)
            .await?;
        debug!(table = %table.name, status = %next, "Table occupied");
    }

    Ok(())
}

/// Frees the order's table if nothing else is pending on it.
///
/// Call after the order has left PENDING.
pub async fn release_table(conn: &mut SqliteConnection, order: &Order) -> EngineResult<()> {
    let Some(table_id) = order.table_id.as_deref() else {
        return Ok(());
    };

    let Some(table) = TableRepository::new(&mut *conn).get_by_id(table_id).await? else {
        return Ok(());
    };

    let others = OrderRepository::new(&mut *conn)
        .count_other_pending(table_id, &order.id)
        .await?;

    match table::status_after_close(table.status, others > 0) {
        Some(next) => {
            TableRepository::new(&mut *conn)
                .set_status(&table.id, next)
                .await?;
            debug!(table = %table.name, status = %next, "Table released");
        }
        None => {
            debug!(
                table = %table.name,
                status = %table.status,
                other_pending = others,
                "Table left unchanged"
            );
        }
    }

    Ok(())
}

/// Credits loyalty points for a paid order.
///
/// Returns the points added, or `None` when the order has no customer or
/// earns nothing.
pub async fn accrue_loyalty(
    conn: &mut SqliteConnection,
    order: &Order,
    loyalty_unit: Decimal,
) -> EngineResult<Option<i64>> {
    let Some(customer_id) = order.customer_id.as_deref() else {
        return Ok(None);
    };

    let points = loyalty::points_for(order.total_amount, loyalty_unit);
    if points <= 0 {
        return Ok(None);
    }

    let balance = CustomerRepository::new(&mut *conn)
        .add_loyalty_points(customer_id, points)
        .await?;

    info!(
        customer_id = %customer_id,
        points = points,
        balance = balance,
        "Loyalty points added"
    );

    Ok(Some(points))
}
