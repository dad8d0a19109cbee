//! # Order Service
//!
//! Entry point for every order and stock operation.
//!
//! ## Transaction Per Operation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    OrderService::pay_order                              │
//! │                                                                         │
//! │  ┌──────────────── db.begin_write()  (BEGIN IMMEDIATE) ─────────────┐  │
//! │  │  load PENDING order + lines                                      │  │
//! │  │  parse payment method ── unknown ──► InvalidArgument             │  │
//! │  │  expand recipes ──► ingredient requirements                      │  │
//! │  │  InventoryLedger::apply_consumption  (versioned writes)          │  │
//! │  │  mark PAID, save order                                           │  │
//! │  │  voucher usage +1      (failure logged, payment continues)       │  │
//! │  │  release table, accrue loyalty                                   │  │
//! │  └───────────────────── commit ─────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ├── any error ──► transaction dropped = rolled back              │
//! │       └── stale / busy ──► backoff, whole operation re-run             │
//! │                            (up to max_retries)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every writing operation takes the same path: the write lock is held
//! from the first statement, so concurrent terminals queue on SQLite's busy
//! timeout, and whatever still fails as busy or stale is retried after a
//! jittered exponential delay.
//!
//! ## Module Organization
//! - `orders` - create, line items, vouchers, cancel, queries
//! - `payment` - pay_order
//! - `inventory` - goods receipt, stock-take, low-stock report
//! - [`requests`] - request/response types

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{info, warn};

use cafe_core::order::DetachedVoucher;
use cafe_core::{CoreError, Order, StaffContext, Voucher};
use cafe_db::{Database, DbConfig, DbError, OrderRepository, StaffRepository, VoucherRepository};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};

mod inventory;
mod orders;
mod payment;
pub mod requests;


pub use requests::{
    AddItemRequest, CreateOrderRequest, OrderDetail, ReceivedItem, StockAdjustment,
    UpdateItemRequest,
};

/// Order lifecycle and inventory service.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct OrderService {
    db: Database,
    config: EngineConfig,
}

impl OrderService {
    pub fn new(db: Database, config: EngineConfig) -> Self {
        OrderService { db, config }
    }

    /// Opens the database named in `config` and runs migrations.
    pub async fn connect(config: EngineConfig) -> EngineResult<Self> {
        let db = Database::new(DbConfig::new(&config.database_path)).await?;
        info!(path = %config.database_path.display(), "Order service ready");
        Ok(OrderService::new(db, config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Runs `operation` again while it fails with a retryable error,
    /// sleeping for an exponentially growing, jittered delay in between.
    ///
    /// After `max_retries` extra attempts the last failure is reported as
    /// `Conflict`.
    async fn with_retry<T, F, Fut>(&self, name: &str, mut operation: F) -> EngineResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let mut backoff = retry_backoff();
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match operation().await {
                Err(e) if e.is_retryable() && attempt <= self.config.max_retries => {
                    let delay = backoff.next_backoff().unwrap_or(RETRY_MAX_BACKOFF);
                    warn!(operation = %name, attempt = attempt, ?delay, error = %e, "Retrying after conflict");
                    tokio::time::sleep(delay).await;
                }
                Err(e) if e.is_retryable() => {
                    return Err(EngineError::conflict(format!(
                        "{} failed after {} attempts: {}",
                        name, attempt, e.message
                    )));
                }
                result => return result,
            }
        }
    }
}

const RETRY_INITIAL_BACKOFF: Duration = Duration::from_millis(10);
const RETRY_MAX_BACKOFF: Duration = Duration::from_millis(250);

fn retry_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: RETRY_INITIAL_BACKOFF,
        max_interval: RETRY_MAX_BACKOFF,
        multiplier: 2.0,
        // Attempts are bounded by max_retries instead
        max_elapsed_time: None,
        ..Default::default()
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

async fn commit(tx: Transaction<'static, Sqlite>) -> EngineResult<()> {
    tx.commit().await.map_err(DbError::from)?;
    Ok(())
}

async fn load_order(conn: &mut SqliteConnection, order_id: &str) -> EngineResult<Order> {
    OrderRepository::new(conn)
        .get_by_id(order_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Order", order_id))
}

async fn load_pending_order(conn: &mut SqliteConnection, order_id: &str) -> EngineResult<Order> {
    let order = load_order(conn, order_id).await?;
    if !order.is_pending() {
        return Err(CoreError::InvalidOrderStatus {
            order_id: order.id,
            current_status: order.status,
        }
        .into());
    }
    Ok(order)
}

/// The voucher record behind the order's attached code, if it still exists.
async fn attached_voucher(
    conn: &mut SqliteConnection,
    order: &Order,
) -> EngineResult<Option<Voucher>> {
    match order.voucher_code.as_deref() {
        Some(code) => Ok(VoucherRepository::new(conn).get_by_code(code).await?),
        None => Ok(None),
    }
}

async fn require_staff(conn: &mut SqliteConnection, staff: &StaffContext) -> EngineResult<()> {
    StaffRepository::new(conn)
        .get_by_id(&staff.staff_id)
        .await?
        .ok_or_else(|| EngineError::not_found("Staff", &staff.staff_id))?;
    Ok(())
}

fn log_detached(order_id: &str, detached: Option<&DetachedVoucher>) {
    if let Some(d) = detached {
        warn!(order_id = %order_id, code = %d.code, reason = %d.reason, "Voucher removed from order");
    }
}
