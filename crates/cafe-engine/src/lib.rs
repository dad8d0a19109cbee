//! # cafe-engine: Order Orchestration for the Cafe POS
//!
//! Ties the pure rules of `cafe-core` to the storage of `cafe-db`. Every
//! public [`OrderService`] operation runs in exactly one database
//! transaction; an error anywhere rolls all of it back.
//!
//! ## Module Organization
//! ```text
//! cafe_engine/
//! ├── lib.rs          ◄─── You are here
//! ├── service/
//! │   ├── mod.rs      ◄─── OrderService, retry loop, shared loaders
//! │   ├── orders.rs   ◄─── create, items, vouchers, cancel, queries
//! │   ├── payment.rs  ◄─── pay_order
//! │   ├── inventory.rs◄─── receive, adjust, low stock
//! │   └── requests.rs ◄─── request/response types
//! ├── ledger.rs       ◄─── InventoryLedger (versioned stock writes)
//! ├── sync.rs         ◄─── table status and loyalty side effects
//! ├── config.rs       ◄─── EngineConfig (CAFE_* variables)
//! ├── telemetry.rs    ◄─── tracing subscriber setup
//! └── error.rs        ◄─── EngineError { code, message }
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use cafe_engine::{init_tracing, CreateOrderRequest, AddItemRequest, EngineConfig, OrderService};
//!
//! init_tracing();
//! let service = OrderService::connect(EngineConfig::from_env()?).await?;
//!
//! let order = service
//!     .create_order(&staff, CreateOrderRequest::takeaway(vec![AddItemRequest::new(latte_id, 2)]))
//!     .await?;
//! let paid = service.pay_order(&staff, &order.order.id, "cash").await?;
//! ```

pub mod config;
pub mod error;
pub mod ledger;
pub mod service;
pub mod sync;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult, ErrorCode};
pub use ledger::InventoryLedger;
pub use service::{
    AddItemRequest, CreateOrderRequest, OrderDetail, OrderService, ReceivedItem,
    StockAdjustment, UpdateItemRequest,
};
pub use telemetry::init_tracing;

pub use cafe_db::OrderFilter;
