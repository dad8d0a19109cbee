//! # Table Occupancy Rules
//!
//! ```text
//!            order opened
//!   EMPTY ─────────────────► SERVING
//!     ▲                         │
//!     └─────────────────────────┘
//!      last pending order paid or cancelled
//!
//!   RESERVED: never changed by the order flow
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{CafeTable, TableStatus};

/// Checks that `table` can take a new order.
///
/// `pending_order_id` is the id of an existing PENDING order on the table,
/// if any.
pub fn check_available(table: &CafeTable, pending_order_id: Option<&str>) -> CoreResult<()> {
    if let Some(order_id) = pending_order_id {
        return Err(CoreError::TableOccupied {
            table: table.name.clone(),
            order_id: order_id.to_string(),
        });
    }

    if table.status != TableStatus::Empty {
        return Err(CoreError::TableUnavailable {
            table: table.name.clone(),
            status: table.status,
        });
    }

    Ok(())
}

/// New status once an order opens on a table, if it changes.
pub fn status_after_open(current: TableStatus) -> Option<TableStatus> {
    match current {
        TableStatus::Empty => Some(TableStatus::Serving),
        _ => None,
    }
}

/// New status once an order on the table is paid or cancelled.
///
/// The table only frees up when it is SERVING and no other PENDING order
/// still points at it.
pub fn status_after_close(current: TableStatus, other_pending_orders: bool) -> Option<TableStatus> {
    match current {
        TableStatus::Serving if !other_pending_orders => Some(TableStatus::Empty),
        _ => None,
    }
}
