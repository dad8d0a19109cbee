//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├── StaleWrite / Busy → retried by the engine                    │
//! │       ▼                                                                 │
//! │  EngineError (cafe-engine) ← code + message for the caller             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// SQLite primary/extended result codes that mean "try again".
///
/// 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED, 261 = SQLITE_BUSY_RECOVERY,
/// 517 = SQLITE_BUSY_SNAPSHOT, 773 = SQLITE_BUSY_TIMEOUT.
const RETRYABLE_SQLITE_CODES: &[&str] = &["5", "6", "261", "517", "773"];

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - Update touched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate voucher code or table name
    /// - Second PENDING order on the same table
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A versioned row changed between read and write.
    ///
    /// ## When This Occurs
    /// Two terminals paying orders that share an ingredient: both read
    /// version 7, the first writes version 8, the second's
    /// `WHERE version = 7` matches nothing.
    #[error("{entity} {id} was modified concurrently")]
    StaleWrite { entity: String, id: String },

    /// SQLite refused the write because another connection holds the lock
    /// or our snapshot is out of date.
    #[error("Database busy: {0}")]
    Busy(String),

    /// A stored value could not be decoded (e.g. malformed decimal text).
    #[error("Invalid data in {column}: {reason}")]
    InvalidData { column: String, reason: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a StaleWrite error.
    pub fn stale(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::StaleWrite {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether re-running the whole transaction may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::StaleWrite { .. } | DbError::Busy(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → busy/locked code → Busy
///                               otherwise analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                let code = db_err.code();

                if code
                    .as_deref()
                    .is_some_and(|c| RETRYABLE_SQLITE_CODES.contains(&c))
                    || msg.contains("database is locked")
                    || msg.contains("database table is locked")
                {
                    DbError::Busy(msg.to_string())
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: <table>.<column>"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_concurrency_errors_are_retryable() {
        assert!(DbError::stale("Ingredient", "i-1").is_retryable());
        assert!(DbError::Busy("database is locked".to_string()).is_retryable());
        assert!(!DbError::not_found("Order", "o-1").is_retryable());
        assert!(!DbError::duplicate("orders.table_id", "t-1").is_retryable());
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
