//! # tabula-migrate
//!
//! Keeps tables in line with the records mapped onto them.
//!
//! ```rust
//! use tabula_migrate::Migrator;
//! use tabula_orm::{Engine, Record};
//!
//! #[derive(Debug, Default, Record)]
//! #[record(table = "users")]
//! struct User {
//!     pub name: String,
//!     pub age: i64,
//! }
//!
//! let engine = Engine::new("sqlite3", ":memory:").unwrap();
//! let migrator = Migrator::new(engine);
//!
//! let plan = migrator.migrate::<User>().unwrap();
//! assert!(plan.created);
//!
//! // Running again changes nothing.
//! assert!(migrator.migrate::<User>().unwrap().is_noop());
//! ```

pub mod diff;
pub mod error;
pub mod migrator;

pub use diff::{difference, ColumnDiff};
pub use error::{MigrateError, Result};
pub use migrator::{migrate, plan, MigrationPlan, Migrator};
