//! Error types for the ORM.

use tabula_core::ValueError;
use thiserror::Error;

/// An error raised by a database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// ORM-specific errors.
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database error from the driver.
    #[error("database error: {0}")]
    Database(#[source] DriverError),

    /// A scanned value could not be converted into the record field.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The engine configuration could not be read.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// The connection was closed.
    #[error("connection is closed")]
    ConnectionClosed,

    /// No row matched a query that expected one.
    #[error("record not found")]
    NotFound,

    /// An operation that needs a table schema ran before `model()`.
    #[error("model is not set")]
    ModelNotSet,

    /// No dialect is registered under the driver name.
    #[error("dialect {0} not found")]
    DialectNotFound(String),

    /// The engine has no driver for this backend.
    #[error("unsupported driver: {0}")]
    UnsupportedDriver(String),

    /// Update arguments were malformed.
    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    /// A column name is not part of the cached schema.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// A result row does not have one value per mapped field.
    #[error("expected {expected} columns, found {found}")]
    ColumnCount {
        /// Number of mapped fields.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// `begin()` was called while a transaction is already active.
    #[error("transaction already active")]
    TransactionActive,

    /// `commit()` or `rollback()` was called without a transaction.
    #[error("no active transaction")]
    NoTransaction,
}

/// Result type alias for ORM operations.
pub type Result<T> = std::result::Result<T, OrmError>;
