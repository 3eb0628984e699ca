//! The engine: a database handle plus the dialect used to talk to it.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tabula_core::{Dialect, DialectRegistry};
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::driver::Db;
use crate::error::{OrmError, Result};
use crate::log;
use crate::session::Session;
use crate::sqlite::SqliteDb;

/// Entry point of the ORM. Hands out [`Session`]s sharing one database.
#[derive(Debug, Clone)]
pub struct Engine {
    db: Arc<dyn Db>,
    dialect: Arc<dyn Dialect>,
}

impl Engine {
    /// Opens the configured database, checks it answers, and resolves the
    /// dialect in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::UnsupportedDriver`] for a driver without a
    /// built-in backend, [`OrmError::DialectNotFound`] if `registry` lacks
    /// the dialect, or the driver error.
    pub fn connect(config: &EngineConfig, registry: &DialectRegistry) -> Result<Self> {
        log::set_level(config.log_level);

        let db: Arc<dyn Db> = match config.driver.as_str() {
            "sqlite3" => Arc::new(SqliteDb::open(&config.source)?),
            other => {
                error!(driver = other, "Unsupported driver");
                return Err(OrmError::UnsupportedDriver(other.to_string()));
            }
        };
        db.ping().inspect_err(|err| error!(%err, "Ping failed"))?;

        let dialect = registry.get(&config.driver).ok_or_else(|| {
            error!(driver = %config.driver, "Dialect not found");
            OrmError::DialectNotFound(config.driver.clone())
        })?;

        info!(driver = %config.driver, source = %config.source, "Connected");
        Ok(Self { db, dialect })
    }

    /// Opens `source` with `driver` using the built-in dialects.
    ///
    /// # Errors
    ///
    /// As [`Engine::connect`].
    pub fn new(driver: &str, source: &str) -> Result<Self> {
        let config = EngineConfig {
            driver: driver.to_string(),
            source: source.to_string(),
            ..EngineConfig::default()
        };
        Self::connect(&config, &DialectRegistry::with_builtin())
    }

    /// Wraps an existing database handle.
    #[must_use]
    pub fn with_db(db: Arc<dyn Db>, dialect: Arc<dyn Dialect>) -> Self {
        Self { db, dialect }
    }

    /// Returns the dialect of this engine.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Creates a session with an empty statement state.
    #[must_use]
    pub fn new_session(&self) -> Session {
        Session::new(Arc::clone(&self.db), Arc::clone(&self.dialect))
    }

    /// Runs `f` inside a transaction on a fresh session.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. If
    /// `f` panics the transaction is rolled back and the panic resumes. If
    /// `f` already committed or rolled back itself, nothing more is done.
    ///
    /// # Errors
    ///
    /// Returns the error of `f`, or the driver error from begin or commit.
    pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Session) -> std::result::Result<T, E>,
        E: From<OrmError>,
    {
        let mut session = self.new_session();
        session.begin()?;

        match panic::catch_unwind(AssertUnwindSafe(|| f(&mut session))) {
            Ok(Ok(value)) => {
                if session.in_transaction() {
                    session.commit()?;
                }
                Ok(value)
            }
            Ok(Err(err)) => {
                if session.in_transaction() {
                    if let Err(rollback_err) = session.rollback() {
                        error!(err = %rollback_err, "Rollback after error failed");
                    }
                }
                Err(err)
            }
            Err(payload) => {
                if session.in_transaction() {
                    if let Err(rollback_err) = session.rollback() {
                        error!(err = %rollback_err, "Rollback after panic failed");
                    }
                }
                panic::resume_unwind(payload)
            }
        }
    }

    /// Closes the database. Sessions created earlier stop working.
    ///
    /// # Errors
    ///
    /// Returns the driver error if closing fails.
    pub fn close(&self) -> Result<()> {
        self.db.close()?;
        info!("Closed database");
        Ok(())
    }
}
