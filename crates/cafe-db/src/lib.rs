//! # cafe-db: Database Layer for the Cafe POS
//!
//! SQLite storage for orders, catalog, stock, vouchers, tables and
//! customers, accessed asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe POS Data Flow                               │
//! │                                                                         │
//! │  OrderService::pay_order (cafe-engine)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     cafe-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (repository/) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ OrderRepo     │    │ 001_initial_ │  │   │
//! │  │   │ Transactions  │◄───│ IngredientRepo│    │ schema.sql   │  │   │
//! │  │   │               │    │ VoucherRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (cafe.db)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cafe_db::{Database, DbConfig, OrderRepository};
//!
//! let db = Database::new(DbConfig::new("cafe.db")).await?;
//!
//! let mut tx = db.begin().await?;
//! let order = OrderRepository::new(&mut tx).get_by_id(&order_id).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::CatalogRepository;
pub use repository::customer::CustomerRepository;
pub use repository::ingredient::IngredientRepository;
pub use repository::order::{OrderFilter, OrderRepository};
pub use repository::staff::StaffRepository;
pub use repository::table::TableRepository;
pub use repository::voucher::VoucherRepository;
