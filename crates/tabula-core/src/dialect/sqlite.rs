//! SQLite dialect.
//!
//! SQLite uses type affinity rather than strict column types, so the names
//! below mostly document intent. Structured JSON values have no mapping.

use super::Dialect;
use crate::kind::ColumnKind;
use crate::value::SqlValue;

/// SQLite dialect, registered as `sqlite3`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn type_name(&self, kind: ColumnKind) -> Option<&'static str> {
        match kind {
            ColumnKind::Bool => Some("bool"),
            ColumnKind::Integer => Some("integer"),
            ColumnKind::BigInt => Some("bigint"),
            ColumnKind::Float => Some("real"),
            ColumnKind::Text => Some("text"),
            ColumnKind::Blob => Some("blob"),
            ColumnKind::DateTime => Some("datetime"),
            ColumnKind::Json => None,
        }
    }

    fn table_exist_sql(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from("SELECT name FROM sqlite_master WHERE type='table' and name = ?"),
            vec![SqlValue::Text(String::from(table))],
        )
    }
}
