//! SQLite driver backed by `rusqlite` and an `r2d2` connection pool.
//!
//! Plain statements borrow any pooled connection for their duration. A
//! transaction checks out one connection, issues `BEGIN` on it and keeps it
//! until `COMMIT` or `ROLLBACK`, so statements of other sessions never run
//! inside it.
//!
//! In-memory databases are opened as a named shared-cache database so every
//! pooled connection sees the same tables.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tabula_core::SqlValue;
use tracing::{debug, error};

use crate::driver::{CommonDb, Db, Rows, Tx};
use crate::error::{OrmError, Result};

type SqlitePool = Pool<SqliteConnectionManager>;
type SqliteConnection = PooledConnection<SqliteConnectionManager>;

static MEMORY_DATABASES: AtomicU64 = AtomicU64::new(0);

impl From<rusqlite::Error> for OrmError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(Box::new(err))
    }
}

impl From<r2d2::Error> for OrmError {
    fn from(err: r2d2::Error) -> Self {
        Self::Database(Box::new(err))
    }
}

/// A pooled SQLite database handle.
pub struct SqliteDb {
    source: String,
    pool: Mutex<Option<SqlitePool>>,
}

impl SqliteDb {
    /// Opens (creating if needed) the database file at `path`.
    ///
    /// `":memory:"` opens a fresh in-memory database shared by the pool.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path == Path::new(":memory:") {
            return Self::open_in_memory();
        }
        let db = Self::with_manager(
            path.display().to_string(),
            SqliteConnectionManager::file(path),
            false,
        )?;
        debug!(path = %path.display(), "Opened SQLite database");
        Ok(db)
    }

    /// Opens a fresh in-memory database.
    ///
    /// Each call gets its own database, shared by the connections of this
    /// handle's pool and dropped with the pool.
    ///
    /// # Errors
    ///
    /// Returns the driver error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let id = MEMORY_DATABASES.fetch_add(1, Ordering::Relaxed);
        let uri = format!(
            "file:tabula-memory-{}-{id}?mode=memory&cache=shared",
            std::process::id()
        );
        let manager = SqliteConnectionManager::file(&uri);
        let db = Self::with_manager(uri, manager, true)?;
        debug!(source = %db.source, "Opened in-memory SQLite database");
        Ok(db)
    }

    fn with_manager(
        source: String,
        manager: SqliteConnectionManager,
        memory: bool,
    ) -> Result<Self> {
        // Surface open errors directly instead of as a pool timeout.
        Connection::open(&source)?;
        let mut builder = Pool::builder();
        if memory {
            // The database lives only while a connection to it is open.
            builder = builder.idle_timeout(None).max_lifetime(None);
        }
        let pool = builder.build(manager)?;
        Ok(Self {
            source,
            pool: Mutex::new(Some(pool)),
        })
    }

    fn connection(&self) -> Result<SqliteConnection> {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(OrmError::ConnectionClosed)?;
        Ok(pool.get()?)
    }
}

impl fmt::Debug for SqliteDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("SqliteDb")
            .field("source", &self.source)
            .field("open", &open)
            .finish()
    }
}

impl CommonDb for SqliteDb {
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        run_query(&*self.connection()?, sql, params)
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        run_exec(&*self.connection()?, sql, params)
    }
}

impl Db for SqliteDb {
    fn begin(&self) -> Result<Box<dyn Tx>> {
        let conn = self.connection()?;
        conn.execute_batch("BEGIN")?;
        Ok(Box::new(SqliteTx {
            conn,
            finished: false,
        }))
    }

    fn ping(&self) -> Result<()> {
        self.connection()?
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        let pool = self
            .pool
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if pool.is_some() {
            debug!(source = %self.source, "Closed SQLite pool");
        }
        Ok(())
    }
}

/// An open SQLite transaction on its own pooled connection.
pub struct SqliteTx {
    conn: SqliteConnection,
    finished: bool,
}

impl SqliteTx {
    fn finish(&mut self, statement: &str) -> Result<()> {
        self.finished = true;
        Ok(self.conn.execute_batch(statement)?)
    }
}

impl fmt::Debug for SqliteTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteTx")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl CommonDb for SqliteTx {
    fn query(&self, sql: &str, params: &[SqlValue]) -> Result<Rows> {
        run_query(&self.conn, sql, params)
    }

    fn exec(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        run_exec(&self.conn, sql, params)
    }
}

impl Tx for SqliteTx {
    fn commit(mut self: Box<Self>) -> Result<()> {
        self.finish("COMMIT")
    }

    fn rollback(mut self: Box<Self>) -> Result<()> {
        self.finish("ROLLBACK")
    }
}

impl Drop for SqliteTx {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(err) = self.finish("ROLLBACK") {
            error!(%err, "Failed to roll back abandoned transaction");
        }
    }
}

fn run_query(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<Rows> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    let values = to_sqlite_values(params);

    let mut result = Rows {
        columns,
        rows: Vec::new(),
    };
    let mut rows = stmt.query(params_from_iter(values.iter()))?;
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(result.columns.len());
        for i in 0..result.columns.len() {
            values.push(from_sqlite_value(row.get::<_, Value>(i)?));
        }
        result.rows.push(values);
    }
    Ok(result)
}

fn run_exec(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let values = to_sqlite_values(params);
    let affected = conn.execute(sql, params_from_iter(values.iter()))?;
    Ok(u64::try_from(affected).unwrap_or(u64::MAX))
}

fn to_sqlite_values(params: &[SqlValue]) -> Vec<Value> {
    params.iter().map(to_sqlite_value).collect()
}

fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Float(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Blob(b) => Value::Blob(b.clone()),
    }
}

fn from_sqlite_value(value: Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Int(i),
        Value::Real(f) => SqlValue::Float(f),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
    }
}
