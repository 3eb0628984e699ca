//! Explicit transactions on a session.

use tracing::{error, info};

use super::Session;
use crate::error::{OrmError, Result};

impl Session {
    /// Starts a transaction. Every later statement runs inside it until
    /// [`Session::commit`] or [`Session::rollback`].
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::TransactionActive`] if one is already open, or the
    /// driver error.
    pub fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            error!("Transaction already active");
            return Err(OrmError::TransactionActive);
        }
        info!("transaction begin");
        let tx = self
            .db
            .begin()
            .inspect_err(|err| error!(%err, "begin failed"))?;
        self.tx = Some(tx);
        Ok(())
    }

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NoTransaction`] if none is open, or the driver
    /// error.
    pub fn commit(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(OrmError::NoTransaction)?;
        info!("transaction commit");
        tx.commit().inspect_err(|err| error!(%err, "commit failed"))
    }

    /// Rolls the open transaction back.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NoTransaction`] if none is open, or the driver
    /// error.
    pub fn rollback(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(OrmError::NoTransaction)?;
        info!("transaction rollback");
        tx.rollback().inspect_err(|err| error!(%err, "rollback failed"))
    }

    /// Returns whether a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }
}
