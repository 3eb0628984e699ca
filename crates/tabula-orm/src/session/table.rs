//! Table lifecycle: model selection, CREATE, DROP and existence checks.

use std::sync::Arc;

use tabula_core::SqlValue;
use tracing::{debug, error};

use super::Session;
use crate::error::{OrmError, Result};
use crate::record::Record;
use crate::schema::TableSchema;

impl Session {
    /// Makes `R` the current model, parsing its schema unless it is already
    /// cached.
    pub fn model<R: Record>(&mut self) -> &mut Self {
        let cached = self
            .state
            .table
            .as_ref()
            .is_some_and(|table| table.is_model::<R>());
        if !cached {
            debug!(table = R::TABLE, "Switching model");
            self.state.table = Some(Arc::new(TableSchema::parse::<R>(self.dialect.as_ref())));
        }
        self
    }

    /// Returns the schema of the current model.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] if [`Session::model`] was never
    /// called.
    pub fn ref_table(&self) -> Result<Arc<TableSchema>> {
        self.state.table.clone().ok_or_else(|| {
            error!("Model is not set");
            OrmError::ModelNotSet
        })
    }

    /// Creates the table of the current model.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] without a model, or the driver error.
    pub fn create_table(&mut self) -> Result<()> {
        let sql = self.ref_table()?.create_table_sql();
        self.raw(&sql, Vec::new()).exec()?;
        Ok(())
    }

    /// Drops the table of the current model if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] without a model, or the driver error.
    pub fn drop_table(&mut self) -> Result<()> {
        let table = self.ref_table()?;
        let sql = format!("DROP TABLE IF EXISTS {}", table.name);
        self.raw(&sql, Vec::new()).exec()?;
        Ok(())
    }

    /// Returns whether the table of the current model exists.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] without a model, or the driver error.
    pub fn has_table(&mut self) -> Result<bool> {
        let table = self.ref_table()?;
        self.table_exists(&table.name)
    }

    /// Returns whether a table called `name` exists.
    ///
    /// # Errors
    ///
    /// Returns the driver error if the existence check fails.
    pub fn table_exists(&mut self, name: &str) -> Result<bool> {
        let (sql, params) = self.dialect.table_exist_sql(name);
        let row = self.raw(&sql, params).query_row()?;
        Ok(matches!(
            row.as_deref(),
            Some([SqlValue::Text(found), ..]) if found == name
        ))
    }

    /// Returns the live column names of table `name`.
    ///
    /// # Errors
    ///
    /// Returns the driver error, e.g. when the table does not exist.
    pub fn table_columns(&mut self, name: &str) -> Result<Vec<String>> {
        let sql = format!("SELECT * FROM {name} LIMIT 1");
        Ok(self.raw(&sql, Vec::new()).query_rows()?.columns)
    }
}
