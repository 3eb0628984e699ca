//! # tabula-core
//!
//! Backend-neutral building blocks for the tabula ORM.
//!
//! This crate provides:
//! - [`SqlValue`] with [`ToSqlValue`] / [`FromSqlValue`] conversions
//! - [`ColumnKind`] and the [`SqlType`] trait tying Rust field types to kinds
//! - The [`Dialect`] trait, the built-in SQLite and PostgreSQL dialects and a
//!   [`DialectRegistry`] to look them up by driver name
//! - The [`Clause`] builder that assembles statements from named fragments
//!
//! ## Building a statement
//!
//! ```rust
//! use tabula_core::{Clause, ClauseKind, ToSqlValue};
//!
//! let mut clause = Clause::new();
//! clause.insert("User", &["Name", "Age"]);
//! clause.values(vec![
//!     vec!["Tom".to_sql_value(), 18_i64.to_sql_value()],
//!     vec!["Sam".to_sql_value(), 25_i64.to_sql_value()],
//! ]);
//!
//! let (sql, params) = clause.build(&[ClauseKind::Insert, ClauseKind::Values]);
//! assert_eq!(sql, "INSERT INTO User (Name,Age) VALUES (?, ?), (?, ?)");
//! assert_eq!(params.len(), 4);
//! ```
//!
//! ## Dialects
//!
//! ```rust
//! use tabula_core::{ColumnKind, DialectRegistry};
//!
//! let registry = DialectRegistry::with_builtin();
//! let sqlite = registry.get("sqlite3").unwrap();
//! assert_eq!(sqlite.data_type_of(ColumnKind::BigInt), "bigint");
//! ```

pub mod clause;
pub mod dialect;
pub mod kind;
pub mod value;

pub use clause::{Clause, ClauseKind, Fragment};
pub use dialect::{Dialect, DialectRegistry, PostgresDialect, SqliteDialect};
pub use kind::{ColumnKind, SqlType};
pub use value::{FromSqlValue, SqlValue, ToSqlValue, ValueError};
