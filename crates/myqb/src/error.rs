//! Error types for myqb

use std::time::Duration;
use thiserror::Error;

/// Result type alias for myqb operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for statement building and execution
#[derive(Debug, Error)]
pub enum DbError {
    /// Builder used without required prior state (no table, empty batch, ...).
    /// Raised synchronously, before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Batch insert row whose columns differ from the first row's columns
    #[error("Shape mismatch in batch row {row}: expected ({expected}), found ({found})")]
    ShapeMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    /// Connection/URL/pool construction error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Driver error, propagated verbatim
    #[error("Query error: {0}")]
    Query(#[from] mysql_async::Error),

    /// Unique constraint violation (ER_DUP_ENTRY)
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Statement exceeded the configured pass-through time limit
    #[error("Statement timeout after {0:?}")]
    Timeout(Duration),

    /// One or more statements of a fanned-out batch failed
    #[error("Aggregate failure: {} batched statement(s) failed", .0.len())]
    Aggregate(Vec<DbError>),
}

impl DbError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a shape mismatch error for a batch row
    pub fn shape_mismatch(row: usize, expected: &[&str], found: &[&str]) -> Self {
        Self::ShapeMismatch {
            row,
            expected: expected.join(", "),
            found: found.join(", "),
        }
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is an aggregate batch failure
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Aggregate(_))
    }

    /// Parse a mysql_async error into a more specific DbError
    pub fn from_db_error(err: mysql_async::Error) -> Self {
        if let mysql_async::Error::Server(ref server) = err {
            match server.code {
                // ER_DUP_ENTRY
                1062 => return Self::UniqueViolation(server.message.clone()),
                // ER_ROW_IS_REFERENCED_2 / ER_NO_REFERENCED_ROW_2
                1451 | 1452 => return Self::ForeignKeyViolation(server.message.clone()),
                // ER_CHECK_CONSTRAINT_VIOLATED
                3819 => return Self::CheckViolation(server.message.clone()),
                _ => {}
            }
        }
        Self::Query(err)
    }
}
