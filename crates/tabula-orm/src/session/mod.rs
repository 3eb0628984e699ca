//! Sessions: one statement in flight at a time against an engine's database.
//!
//! A [`Session`] holds the statement being assembled (clause fragments, the
//! rendered SQL and its parameters) and the cached schema of the current
//! model. The CRUD, table and transaction operations live in submodules.

mod record;
mod table;
mod transaction;

use std::fmt;
use std::mem;
use std::sync::Arc;

use tabula_core::{Clause, Dialect, SqlValue};
use tracing::{error, info};

use crate::driver::{Db, Rows, Tx};
use crate::error::Result;
use crate::schema::TableSchema;

pub use record::UpdateArgs;

#[derive(Debug, Default)]
struct Statement {
    clause: Clause,
    sql: String,
    params: Vec<SqlValue>,
    table: Option<Arc<TableSchema>>,
}

/// A unit of work against one database.
///
/// Builder methods ([`Session::where_clause`], [`Session::order_by`],
/// [`Session::limit`], [`Session::raw`]) return `&mut Self` so calls can be
/// chained into a terminal operation:
///
/// ```rust
/// use tabula_orm::core::ToSqlValue;
/// use tabula_orm::{Engine, Record};
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     pub name: String,
///     pub age: i64,
/// }
///
/// let engine = Engine::new("sqlite3", ":memory:").unwrap();
/// let mut session = engine.new_session();
/// session.model::<User>().create_table().unwrap();
/// session
///     .insert(&mut [User { name: "Tom".into(), age: 18 }])
///     .unwrap();
///
/// let tom: User = session
///     .where_clause("name = ?", vec!["Tom".to_sql_value()])
///     .first()
///     .unwrap();
/// assert_eq!(tom.age, 18);
/// ```
pub struct Session {
    db: Arc<dyn Db>,
    dialect: Arc<dyn Dialect>,
    tx: Option<Box<dyn Tx>>,
    state: Statement,
}

impl Session {
    /// Creates a session over `db` using `dialect`.
    #[must_use]
    pub fn new(db: Arc<dyn Db>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            db,
            dialect,
            tx: None,
            state: Statement::default(),
        }
    }

    /// Returns the dialect of this session.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Sets raw SQL and parameters for the next execution.
    pub fn raw(&mut self, sql: &str, params: Vec<SqlValue>) -> &mut Self {
        self.state.sql = sql.to_string();
        self.state.params = params;
        self
    }

    /// Returns the pending SQL and parameters.
    #[must_use]
    pub fn pending(&self) -> (&str, &[SqlValue]) {
        (&self.state.sql, &self.state.params)
    }

    /// Resets the pending SQL, parameters and clause fragments.
    ///
    /// The cached model schema is kept.
    pub fn clear(&mut self) {
        self.state.sql.clear();
        self.state.params.clear();
        self.state.clause.clear();
    }

    /// Executes the pending statement and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns the driver error if execution fails.
    pub fn exec(&mut self) -> Result<u64> {
        let (sql, params) = self.take_pending();
        info!(sql = %sql, params = ?params, "exec");
        let result = match &self.tx {
            Some(tx) => tx.exec(&sql, &params),
            None => self.db.exec(&sql, &params),
        };
        result.inspect_err(|err| error!(%err, sql = %sql, "exec failed"))
    }

    /// Runs the pending query and returns its first row, if any.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    pub fn query_row(&mut self) -> Result<Option<Vec<SqlValue>>> {
        let (sql, params) = self.take_pending();
        info!(sql = %sql, params = ?params, "query_row");
        let result = match &self.tx {
            Some(tx) => tx.query_row(&sql, &params),
            None => self.db.query_row(&sql, &params),
        };
        result.inspect_err(|err| error!(%err, sql = %sql, "query_row failed"))
    }

    /// Runs the pending query and returns every row.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the query fails.
    pub fn query_rows(&mut self) -> Result<Rows> {
        let (sql, params) = self.take_pending();
        info!(sql = %sql, params = ?params, "query_rows");
        let result = match &self.tx {
            Some(tx) => tx.query(&sql, &params),
            None => self.db.query(&sql, &params),
        };
        result.inspect_err(|err| error!(%err, sql = %sql, "query_rows failed"))
    }

    fn take_pending(&mut self) -> (String, Vec<SqlValue>) {
        let sql = mem::take(&mut self.state.sql);
        let params = mem::take(&mut self.state.params);
        self.state.clause.clear();
        (sql, params)
    }

    /// Runs a terminal operation, resetting the pending statement if it
    /// fails before or during execution.
    fn terminal<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = f(self);
        if result.is_err() {
            self.clear();
        }
        result
    }

    /// Runs `f` with the statement state set aside, then restores it.
    ///
    /// Hooks go through here so the queries they issue never leak into the
    /// statement being built.
    fn isolated<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = mem::take(&mut self.state);
        let result = f(self);
        self.state = saved;
        result
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("dialect", &self.dialect.name())
            .field("in_transaction", &self.tx.is_some())
            .field("sql", &self.state.sql)
            .field("params", &self.state.params)
            .field("table", &self.state.table.as_ref().map(|t| t.name.as_str()))
            .finish_non_exhaustive()
    }
}
