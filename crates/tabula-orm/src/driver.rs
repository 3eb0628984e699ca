//! The driver boundary.
//!
//! A session never talks to a backend directly. It goes through
//! [`CommonDb`], implemented both by the plain database handle ([`Db`]) and
//! by a transaction handle ([`Tx`]), so the same statement code runs inside
//! and outside a transaction.

use std::fmt::Debug;

use tabula_core::SqlValue;

use crate::error::Result;

/// A fully materialized query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rows {
    /// Column names, in result order.
    pub columns: Vec<String>,
    /// One vector of values per row, aligned with `columns`.
    pub rows: Vec<Vec<SqlValue>>,
}

impl Rows {
    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the result has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Statement execution shared by database and transaction handles.
pub trait CommonDb: Debug + Send {
    /// Runs a query and collects every row.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the statement fails.
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows>;

    /// Runs a query and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the statement fails.
    fn query_row(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Vec<SqlValue>>> {
        Ok(self.query(sql, params)?.rows.into_iter().next())
    }

    /// Executes a statement and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the statement fails.
    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;
}

/// A database handle shared by every session of an engine.
pub trait Db: CommonDb + Sync {
    /// Starts a transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the transaction cannot be started.
    fn begin(&self) -> Result<Box<dyn Tx>>;

    /// Checks that the database is reachable.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the database does not answer.
    fn ping(&self) -> Result<()>;

    /// Closes the handle. Later calls fail.
    ///
    /// # Errors
    ///
    /// Returns the driver error if closing fails.
    fn close(&self) -> Result<()>;
}

/// A transaction handle. Dropping it without [`Tx::commit`] rolls back.
pub trait Tx: CommonDb {
    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the commit fails.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the rollback fails.
    fn rollback(self: Box<Self>) -> Result<()>;
}
