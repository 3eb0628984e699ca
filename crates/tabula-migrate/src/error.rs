//! Error types for the migration engine.

use tabula_orm::OrmError;

/// Errors that can occur while migrating a table.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// A session or driver operation failed.
    #[error("ORM error: {0}")]
    Orm(#[from] OrmError),

    /// The record maps no columns, so no table can be built for it.
    #[error("Record for table '{0}' has no mapped columns")]
    NoColumns(String),
}

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
