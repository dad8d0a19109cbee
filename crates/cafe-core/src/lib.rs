//! # cafe-core: Pure Business Logic for the Cafe POS
//!
//! Every rule that decides what an order costs, whether a voucher applies
//! and whether there is enough stock to sell lives here, as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cafe POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                cafe-engine (OrderService)                       │   │
//! │  │    create, add/update/remove item, voucher, pay, cancel        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cafe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌───────┐  │   │
//! │  │   │  order  │ │ voucher │ │ recipe  │ │ inventory │ │ table │  │   │
//! │  │   │ totals  │ │  rules  │ │ expand  │ │   plans   │ │loyalty│  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └───────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    cafe-db (Database Layer)                     │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Ingredient, Voucher, CafeTable, ...)
//! - [`money`] - Decimal money type
//! - [`order`] - Order aggregate and its totals
//! - [`voucher`] - Voucher evaluation
//! - [`recipe`] - Recipe expansion into ingredient requirements
//! - [`inventory`] - Stock consumption / receipt / adjustment plans
//! - [`table`] - Table occupancy rules
//! - [`loyalty`] - Loyalty point accrual
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use cafe_core::order::{Order, Pricing};
//! use cafe_core::{Money, OrderType, Product};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let latte = Product {
//!     id: "latte".into(),
//!     name: "Latte".into(),
//!     price: Money::from_major(25_000),
//!     is_available: true,
//!     created_at: now,
//!     updated_at: now,
//! };
//!
//! let mut order = Order::new(OrderType::Takeaway, None, "staff-1", None, now);
//! let totals = order.add_item(&latte, 2, None, Pricing::at(now)).unwrap();
//! assert_eq!(totals.total, Money::from_major(50_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod inventory;
pub mod loyalty;
pub mod money;
pub mod order;
pub mod recipe;
pub mod table;
pub mod types;
pub mod validation;
pub mod voucher;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{Order, OrderLine, OrderTotals, Pricing};
pub use types::*;
pub use voucher::VoucherCheck;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines on one order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum length of line notes and adjustment reasons.
pub const MAX_NOTE_LENGTH: usize = 255;

pub const MAX_VOUCHER_CODE_LENGTH: usize = 50;

/// Decimal places kept when a percentage produces fractional money.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Currency units per loyalty point unless configured otherwise.
pub const DEFAULT_LOYALTY_UNIT: i64 = 10;
