//! # Repository Module
//!
//! Database repository implementations for the cafe engine.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  OrderService::pay_order                                               │
//! │       │                                                                 │
//! │       │  let mut tx = db.begin().await?;                               │
//! │       │  OrderRepository::new(&mut tx).get_by_id(id)                   │
//! │       ▼                                                                 │
//! │  OrderRepository<'c>  (borrows &mut SqliteConnection)                  │
//! │  ├── get_by_id / insert / save                                         │
//! │  └── pending_for_table / list                                          │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every repository works on whatever connection it is handed: a pooled  │
//! │  connection for reads, or the open transaction for a whole operation.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CatalogRepository`](catalog::CatalogRepository) - Products and recipes
//! - [`IngredientRepository`](ingredient::IngredientRepository) - Stock rows, versioned writes
//! - [`VoucherRepository`](voucher::VoucherRepository) - Voucher lookup and usage
//! - [`TableRepository`](table::TableRepository) - Table status
//! - [`CustomerRepository`](customer::CustomerRepository) - Loyalty balances
//! - [`StaffRepository`](staff::StaffRepository) - Staff lookup
//! - [`OrderRepository`](order::OrderRepository) - Orders and their lines

use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use cafe_core::Money;

use crate::error::{DbError, DbResult};

pub mod catalog;
pub mod customer;
pub mod ingredient;
pub mod order;
pub mod staff;
pub mod table;
pub mod voucher;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Decimal columns
// =============================================================================

/// Parses a decimal TEXT column.
pub(crate) fn parse_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| DbError::InvalidData {
        column: column.to_string(),
        reason: format!("'{raw}': {e}"),
    })
}

pub(crate) fn parse_money(column: &str, raw: &str) -> DbResult<Money> {
    parse_decimal(column, raw).map(Money::new)
}

pub(crate) fn parse_optional_money(column: &str, raw: Option<&str>) -> DbResult<Option<Money>> {
    raw.map(|r| parse_money(column, r)).transpose()
}

/// Canonical TEXT form of a decimal value.
pub(crate) fn decimal_text(value: Decimal) -> String {
    value.normalize().to_string()
}

// =============================================================================
// ID Generation
// =============================================================================

/// Generates a new entity ID (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_text_round_trips() {
        assert_eq!(decimal_text(dec!(25000.00)), "25000");
        assert_eq!(decimal_text(dec!(0.0540)), "0.054");
        assert_eq!(parse_decimal("qty", "0.054").unwrap(), dec!(0.054));
    }

    #[test]
    fn malformed_decimal_is_invalid_data() {
        let err = parse_decimal("price", "12,5").unwrap_err();
        assert!(matches!(err, DbError::InvalidData { .. }));
    }
}
