//! # Database Error Types
//!
//! Error types for Store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        Rule violation (CoreError)          │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ◄──────── DbError::Domain                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Transport maps code() to a status                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kitchenpos_core::CoreError;
use thiserror::Error;

/// Store operation errors.
///
/// Rule violations arrive as [`DbError::Domain`]; everything else is a
/// storage failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// A domain rule rejected the operation before anything was written.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A compare-and-set UPDATE matched fewer rows than expected.
    ///
    /// ## When This Occurs
    /// - Two requests grouped the same table at the same time
    /// - An order status changed between read and write
    #[error("Concurrent modification of {entity} {id}")]
    Conflict { entity: String, id: String },

    /// A stored row no longer satisfies a domain invariant.
    #[error("Corrupt {entity} row {id}: {reason}")]
    CorruptRow {
        entity: String,
        id: String,
        reason: String,
    },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

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

    /// Creates a Conflict error.
    pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Machine-readable code the transport maps to a status.
    pub fn code(&self) -> &'static str {
        match self {
            DbError::Domain(err) => err.code(),
            DbError::NotFound { .. } => "NOT_FOUND",
            DbError::Conflict { .. } => "CONFLICT",
            DbError::CorruptRow { .. } => "CORRUPT_ROW",
            DbError::ForeignKeyViolation { .. } => "FOREIGN_KEY_VIOLATION",
            DbError::ConnectionFailed(_) => "CONNECTION_FAILED",
            DbError::MigrationFailed(_) => "MIGRATION_FAILED",
            DbError::QueryFailed(_) => "QUERY_FAILED",
            DbError::PoolExhausted => "POOL_EXHAUSTED",
            DbError::Internal(_) => "INTERNAL",
        }
    }

    /// True for id lookup misses, from either layer.
    pub fn is_not_found(&self) -> bool {
        match self {
            DbError::Domain(err) => err.is_not_found(),
            DbError::NotFound { .. } => true,
            _ => false,
        }
    }

    /// Returns the domain error, if this is one.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            DbError::Domain(err) => Some(err),
            _ => None,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
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

                // "FOREIGN KEY constraint failed"
                if msg.contains("FOREIGN KEY constraint failed") {
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
    fn test_domain_errors_keep_their_code() {
        let err: DbError = CoreError::EmptyLineItems.into();
        assert_eq!(err.code(), "EMPTY_LINE_ITEMS");
        assert!(err.as_domain().is_some());
        assert_eq!(err.to_string(), "An order needs at least one line item");
    }

    #[test]
    fn test_not_found_from_either_layer() {
        assert!(DbError::not_found("Order", "o-1").is_not_found());
        assert!(DbError::from(CoreError::not_found("Order", "o-1")).is_not_found());
        assert!(!DbError::conflict("OrderTable", "t-1").is_not_found());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
