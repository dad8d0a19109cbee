//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cafe-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  cafe-engine errors                                                    │
//! │  └── EngineError      - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError ← DbError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{OrderStatus, TableStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// Raised for orders, order lines, products, ingredients, vouchers,
    /// tables, customers and staff.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Order is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Adding items to a paid order
    /// - Cancelling an already cancelled order
    /// - Paying an order twice
    #[error("Order {order_id} is {current_status}, cannot perform operation")]
    InvalidOrderStatus {
        order_id: String,
        current_status: OrderStatus,
    },

    /// Product exists but is switched off in the menu.
    #[error("Product '{name}' is not available")]
    ProductNotAvailable { product_id: String, name: String },

    /// Not enough of an ingredient to fulfil the order's recipes.
    ///
    /// ## User Workflow
    /// ```text
    /// Pay order (2 × Latte)
    ///      │
    ///      ▼
    /// Recipe: 0.2 L milk per latte → 0.4 L required
    ///      │
    ///      ▼
    /// Stock: 0.25 L on hand
    ///      │
    ///      ▼
    /// InsufficientStock { ingredient: "Milk", required: 0.4, available: 0.25 }
    ///      │
    ///      ▼
    /// Payment aborted, order stays PENDING
    /// ```
    #[error("Insufficient stock for {ingredient}: required {required}, available {available}")]
    InsufficientStock {
        ingredient_id: String,
        ingredient: String,
        required: Decimal,
        available: Decimal,
    },

    /// Voucher exists but does not qualify for this order.
    #[error("Voucher {code} cannot be applied: {reason}")]
    VoucherRejected { code: String, reason: String },

    /// Removing a voucher from an order that has none.
    #[error("Order {order_id} does not have any voucher applied")]
    NoVoucherApplied { order_id: String },

    /// Table already hosts a pending order.
    #[error("Table {table} already has a pending order ({order_id})")]
    TableOccupied { table: String, order_id: String },

    /// Table is serving or reserved and cannot take a new order.
    #[error("Table {table} is {status} and cannot receive a new order")]
    TableUnavailable { table: String, status: TableStatus },

    /// Order has reached the maximum number of lines.
    #[error("Order cannot have more than {max} lines")]
    TooManyLines { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or positive.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            ingredient_id: "ing-1".to_string(),
            ingredient: "Milk".to_string(),
            required: dec!(0.4),
            available: dec!(0.25),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Milk: required 0.4, available 0.25"
        );
    }

    #[test]
    fn test_invalid_status_message() {
        let err = CoreError::InvalidOrderStatus {
            order_id: "o-1".to_string(),
            current_status: OrderStatus::Paid,
        };
        assert_eq!(err.to_string(), "Order o-1 is PAID, cannot perform operation");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
