//! # Domain Types
//!
//! Core domain types used throughout the cafe engine.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Ingredient    │   │    Voucher      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  code (UPPER)   │       │
//! │  │  name, price    │   │  quantity       │   │  type, value    │       │
//! │  │  recipe ────────┼──►│  reorder_level  │   │  window, limit  │       │
//! │  └─────────────────┘   │  version        │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   CafeTable     │   │    Customer     │   │     Staff       │       │
//! │  │  EMPTY          │   │  phone          │   │  username       │       │
//! │  │  SERVING        │   │  loyalty_points │   │  full_name      │       │
//! │  │  RESERVED       │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Orders and their lines live in [`crate::order`].
//!
//! ## Enum Storage
//! Every enum is stored as SCREAMING_SNAKE_CASE text (`DINE_IN`, `PAID`,
//! `FIXED_AMOUNT`) both in SQLite and in serialized snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Enum helper
// =============================================================================

/// Implements `as_str`, `Display` and case-insensitive `FromStr` for a
/// fieldless enum, keeping the text form in one place.
macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Canonical text form, as stored in the database.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Every accepted text form.
            pub fn allowed() -> Vec<String> {
                vec![$($text.to_string()),+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase();
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ValidationError::NotAllowed {
                        field: $field.to_string(),
                        allowed: $name::allowed(),
                    }),
                }
            }
        }
    };
}

// =============================================================================
// Order Type / Status
// =============================================================================

/// How the order is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Served at a table; requires a table id.
    DineIn,
    Takeaway,
    Delivery,
}

text_enum!(OrderType, "order_type", {
    DineIn => "DINE_IN",
    Takeaway => "TAKEAWAY",
    Delivery => "DELIVERY",
});

/// Order lifecycle status.
///
/// ## State Machine
/// ```text
///                  pay
///   ┌─────────┐ ─────────► ┌──────┐
///   │ PENDING │            │ PAID │
///   └─────────┘ ─────┐     └──────┘
///                    │ cancel
///                    ▼
///              ┌───────────┐
///              │ CANCELLED │
///              └───────────┘
/// ```
/// PAID and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Open, editable.
    Pending,
    /// Paid; stock consumed.
    Paid,
    /// Cancelled without payment.
    Cancelled,
}

text_enum!(OrderStatus, "status", {
    Pending => "PENDING",
    Paid => "PAID",
    Cancelled => "CANCELLED",
});

impl OrderStatus {
    /// True once the order can no longer change.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Accepted payment methods.
///
/// Parsed case-insensitively: `"cash"`, `"Cash"` and `"CASH"` are all
/// [`PaymentMethod::Cash`]. Anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    /// Bank transfer / QR.
    Transfer,
    Card,
}

text_enum!(PaymentMethod, "payment_method", {
    Cash => "CASH",
    Transfer => "TRANSFER",
    Card => "CARD",
});

// =============================================================================
// Product & Recipe
// =============================================================================

/// A menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name; copied onto order lines.
    pub name: String,

    /// Current selling price.
    pub price: Money,

    /// Whether the product can be ordered right now.
    pub is_available: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a product's recipe: how much of an ingredient a single
/// unit of the product consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeItem {
    pub ingredient_id: String,
    pub quantity_needed: Decimal,
}

// =============================================================================
// Ingredient
// =============================================================================

/// A raw material tracked in stock.
///
/// ## Optimistic Concurrency
/// `version` is bumped on every stock write. Writers send the version they
/// read; a mismatch means another terminal changed the row in between.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,

    /// Unit of measure (`kg`, `l`, `pcs`, ...).
    pub unit: String,

    /// Quantity on hand. Never negative.
    pub quantity_on_hand: Decimal,

    /// Threshold at or below which the ingredient is reported as low.
    pub reorder_level: Decimal,

    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Checks if stock has fallen to the reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.quantity_on_hand <= self.reorder_level
    }
}

// =============================================================================
// Voucher
// =============================================================================

/// Discount calculation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    /// Flat amount off the order.
    FixedAmount,
    /// Percent of the order amount, optionally capped.
    Percentage,
}

text_enum!(VoucherType, "voucher_type", {
    FixedAmount => "FIXED_AMOUNT",
    Percentage => "PERCENTAGE",
});

/// A discount code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    pub id: String,

    /// Unique code, stored upper-case.
    pub code: String,

    pub description: Option<String>,
    pub voucher_type: VoucherType,

    /// Amount for FIXED_AMOUNT, percent (0-100) for PERCENTAGE.
    pub discount_value: Decimal,

    /// Order amount required before the voucher qualifies.
    pub minimum_order_amount: Option<Money>,

    /// Cap on a PERCENTAGE discount.
    pub maximum_discount_amount: Option<Money>,

    /// Start of validity, inclusive.
    pub valid_from: DateTime<Utc>,

    /// End of validity, exclusive.
    pub valid_to: DateTime<Utc>,

    pub usage_limit: i64,
    pub times_used: i64,
    pub is_active: bool,
}

// =============================================================================
// Table
// =============================================================================

/// Occupancy state of a dine-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Empty,
    Serving,
    /// Held for a booking; never changed by order flow.
    Reserved,
}

text_enum!(TableStatus, "table_status", {
    Empty => "EMPTY",
    Serving => "SERVING",
    Reserved => "RESERVED",
});

impl Default for TableStatus {
    fn default() -> Self {
        TableStatus::Empty
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CafeTable {
    pub id: String,
    pub name: String,
    pub status: TableStatus,
}

// =============================================================================
// Customer & Staff
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub phone: String,
    pub full_name: String,
    pub loyalty_points: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: String,
    pub username: String,
    pub full_name: String,
}

/// The staff member performing an operation.
///
/// Passed explicitly to every mutating engine call; the engine checks the
/// id exists and stamps it on new orders and in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffContext {
    pub staff_id: String,
    pub username: String,
}

impl StaffContext {
    pub fn new(staff_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            staff_id: staff_id.into(),
            username: username.into(),
        }
    }
}

impl From<&Staff> for StaffContext {
    fn from(staff: &Staff) -> Self {
        StaffContext::new(staff.id.clone(), staff.username.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_method_case_insensitive() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("Transfer".parse::<PaymentMethod>().unwrap(), PaymentMethod::Transfer);
        assert_eq!(" CARD ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
    }

    #[test]
    fn test_payment_method_rejects_unknown() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        match err {
            ValidationError::NotAllowed { field, allowed } => {
                assert_eq!(field, "payment_method");
                assert_eq!(allowed, vec!["CASH", "TRANSFER", "CARD"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_enum_text_round_trip() {
        assert_eq!(OrderType::DineIn.to_string(), "DINE_IN");
        assert_eq!("dine_in".parse::<OrderType>().unwrap(), OrderType::DineIn);
        assert_eq!(VoucherType::FixedAmount.as_str(), "FIXED_AMOUNT");
        assert_eq!("reserved".parse::<TableStatus>().unwrap(), TableStatus::Reserved);
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&OrderType::Takeaway).unwrap();
        assert_eq!(json, "\"TAKEAWAY\"");
        let status: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_ingredient_low_stock_threshold_inclusive() {
        let mut ingredient = Ingredient {
            id: "ing-1".to_string(),
            name: "Milk".to_string(),
            unit: "l".to_string(),
            quantity_on_hand: dec!(2),
            reorder_level: dec!(2),
            version: 0,
            updated_at: Utc::now(),
        };
        assert!(ingredient.is_low_stock());

        ingredient.quantity_on_hand = dec!(2.01);
        assert!(!ingredient.is_low_stock());
    }
}
