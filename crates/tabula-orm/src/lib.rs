//! # tabula-orm
//!
//! A small ORM mapping plain structs onto tables.
//!
//! This crate provides:
//! - The [`Record`] trait and `#[derive(Record)]` describing how a struct
//!   maps onto a table
//! - [`TableSchema`], the record layout resolved against a dialect
//! - [`Session`] for CRUD, table lifecycle and transactions
//! - [`Engine`], which opens a database and hands out sessions
//! - Lifecycle [`Hooks`] run around inserts, queries, updates and deletes
//!
//! ## Quick Start
//!
//! ```rust
//! use tabula_orm::core::ToSqlValue;
//! use tabula_orm::{Engine, Record};
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! #[record(table = "users")]
//! struct User {
//!     #[record(tag = "PRIMARY KEY")]
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! let engine = Engine::new("sqlite3", ":memory:").unwrap();
//! let mut session = engine.new_session();
//! session.model::<User>().create_table().unwrap();
//!
//! let mut users = [
//!     User { name: "Tom".into(), age: 18 },
//!     User { name: "Sam".into(), age: 25 },
//! ];
//! assert_eq!(session.insert(&mut users).unwrap(), 2);
//!
//! let mut found: Vec<User> = Vec::new();
//! session.order_by("age DESC").find(&mut found).unwrap();
//! assert_eq!(found[0].name, "Sam");
//!
//! let updated = session
//!     .model::<User>()
//!     .where_clause("name = ?", vec!["Tom".to_sql_value()])
//!     .update(vec!["age".to_sql_value(), 30_i64.to_sql_value()])
//!     .unwrap();
//! assert_eq!(updated, 1);
//! assert_eq!(session.count().unwrap(), 2);
//! ```
//!
//! ## Transactions
//!
//! ```rust
//! use tabula_orm::{Engine, OrmError, Record};
//!
//! #[derive(Debug, Default, Record)]
//! struct Item {
//!     pub id: i64,
//! }
//!
//! let engine = Engine::new("sqlite3", ":memory:").unwrap();
//! engine.new_session().model::<Item>().create_table().unwrap();
//!
//! let result: Result<(), OrmError> = engine.transaction(|s| {
//!     s.insert(&mut [Item { id: 1 }])?;
//!     Err(OrmError::NotFound)
//! });
//! assert!(result.is_err());
//! assert_eq!(engine.new_session().model::<Item>().count().unwrap(), 0);
//! ```

extern crate self as tabula_orm;

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod log;
pub mod record;
pub mod schema;
pub mod session;
pub mod sqlite;

pub use tabula_core as core;
pub use tabula_derive::Record;

pub use config::EngineConfig;
pub use driver::{CommonDb, Db, Rows, Tx};
pub use engine::Engine;
pub use error::{DriverError, OrmError, Result};
pub use log::{set_level, LogLevel};
pub use record::{FieldDef, Hooks, Record, RecordHook, SessionHook, StatementHooks};
pub use schema::{Field, TableSchema};
pub use session::{Session, UpdateArgs};
pub use sqlite::{SqliteDb, SqliteTx};
