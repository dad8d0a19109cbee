//! # Engine Error Type
//!
//! Unified error type returned by every [`OrderService`](crate::OrderService)
//! operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Cafe Engine                        │
//! │                                                                         │
//! │  Caller                      Engine                                     │
//! │  ──────                      ──────                                     │
//! │                                                                         │
//! │  service.pay_order(..)                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Operation (one transaction)                                     │  │
//! │  │  Result<T, EngineError>                                          │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::StaleWrite ───────┐                │  │
//! │  │         │                                       │  (retryable)   │  │
//! │  │         ▼                                       ▼                │  │
//! │  │  Domain Error? ─── CoreError::InsufficientStock ── EngineError ─►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  match err.code {                                                       │
//! │    ErrorCode::InsufficientStock => show_restock_warning(err.message),   │
//! │    ErrorCode::Conflict => retry_later(),                                │
//! │    ..                                                                   │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! Errors serialize to a machine-readable `code` and a human-readable
//! `message`, so they can be handed to any front end as-is.

use serde::Serialize;
use tracing::error;

use cafe_core::{CoreError, ValidationError};
use cafe_db::DbError;

/// Error returned from engine operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Milk: required 0.4, available 0.25"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Set for stale-version and busy-database failures.
    #[serde(skip)]
    retryable: bool,
}

/// Error codes for engine responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Order, line, product, ingredient, voucher, table, customer or staff
    /// does not exist
    NotFound,

    /// Operation not allowed in the order's current status
    InvalidState,

    /// Caller input rejected (bad quantity, unknown payment method, ...)
    InvalidArgument,

    /// Not enough ingredient stock to pay the order
    InsufficientStock,

    /// Concurrent modification, duplicate or occupied resource
    Conflict,

    /// Database operation failed
    DatabaseError,

    /// Internal engine error
    Internal,
}

impl EngineError {
    /// Creates a new engine error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        EngineError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        EngineError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::InvalidArgument, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::new(ErrorCode::Internal, message)
    }

    /// Whether re-running the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

/// Converts database errors to engine errors.
impl From<DbError> for EngineError {
    fn from(err: DbError) -> Self {
        let retryable = err.is_retryable();
        let mut converted = match err {
            DbError::NotFound { entity, id } => EngineError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                EngineError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::ForeignKeyViolation { message } => {
                error!("Foreign key violation: {}", message);
                EngineError::invalid_argument("Invalid reference")
            }
            DbError::StaleWrite { entity, id } => EngineError::conflict(format!(
                "{} {} was modified by another operation",
                entity, id
            )),
            DbError::Busy(e) => EngineError::conflict(format!("Database busy: {}", e)),
            DbError::InvalidData { column, reason } => {
                error!(column = %column, "Invalid stored data: {}", reason);
                EngineError::new(ErrorCode::DatabaseError, "Stored data is invalid")
            }
            DbError::ConnectionFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                EngineError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                error!("Database query failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                error!("Transaction failed: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                EngineError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                EngineError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        };
        converted.retryable = retryable;
        converted
    }
}

/// Converts core errors to engine errors.
impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InvalidOrderStatus { .. } => ErrorCode::InvalidState,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::TableOccupied { .. } => ErrorCode::Conflict,
            CoreError::ProductNotAvailable { .. }
            | CoreError::NoVoucherApplied { .. }
            | CoreError::VoucherRejected { .. }
            | CoreError::TableUnavailable { .. }
            | CoreError::TooManyLines { .. }
            | CoreError::QuantityTooLarge { .. } => ErrorCode::InvalidArgument,
            CoreError::Validation(e) => return EngineError::from_validation(e),
        };
        EngineError::new(code, err.to_string())
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::from_validation(&err)
    }
}

impl EngineError {
    fn from_validation(err: &ValidationError) -> Self {
        EngineError::invalid_argument(err.to_string())
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Convenience type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
