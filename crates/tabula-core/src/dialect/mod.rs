//! SQL dialect support.
//!
//! Backends disagree on column type names and on how to ask whether a table
//! exists. A [`Dialect`] captures exactly those two differences; everything
//! else in the ORM is backend-neutral.
//!
//! Dialects are looked up by backend name in a [`DialectRegistry`] that the
//! application builds once at startup and hands to the engine.

mod postgres;
mod sqlite;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::kind::ColumnKind;
use crate::value::SqlValue;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the column type for `kind`, or `None` if this backend cannot
    /// store it.
    fn type_name(&self, kind: ColumnKind) -> Option<&'static str>;

    /// Returns a parameterized query whose single result column holds the
    /// table name when the table exists.
    fn table_exist_sql(&self, table: &str) -> (String, Vec<SqlValue>);

    /// Returns the column type for `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the dialect has no mapping for `kind`.
    fn data_type_of(&self, kind: ColumnKind) -> &'static str {
        self.type_name(kind)
            .unwrap_or_else(|| panic!("invalid sql type {kind} for dialect {}", self.name()))
    }
}

/// Name-to-dialect lookup table.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in dialects under their driver
    /// names: `sqlite3` and `postgres`.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("sqlite3", SqliteDialect::new());
        registry.register("postgres", PostgresDialect::new());
        registry
    }

    /// Registers `dialect` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, dialect: impl Dialect + 'static) {
        self.dialects.insert(name.into(), Arc::new(dialect));
    }

    /// Looks up the dialect registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(name).cloned()
    }

    /// Returns the registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }
}
