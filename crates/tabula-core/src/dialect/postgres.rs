//! PostgreSQL dialect.

use super::Dialect;
use crate::kind::ColumnKind;
use crate::value::SqlValue;

/// PostgreSQL dialect, registered as `postgres`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn type_name(&self, kind: ColumnKind) -> Option<&'static str> {
        let ty = match kind {
            ColumnKind::Bool => "boolean",
            ColumnKind::Integer => "integer",
            ColumnKind::BigInt => "bigint",
            ColumnKind::Float => "double precision",
            ColumnKind::Text => "text",
            ColumnKind::Blob => "bytea",
            ColumnKind::DateTime => "timestamp",
            ColumnKind::Json => "jsonb",
        };
        Some(ty)
    }

    fn table_exist_sql(&self, table: &str) -> (String, Vec<SqlValue>) {
        (
            String::from(
                "SELECT table_name FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = ?",
            ),
            vec![SqlValue::Text(String::from(table))],
        )
    }
}
