//! Record operations: insert, find, first, update, delete and count.

use std::collections::{BTreeMap, HashMap};

use tabula_core::{ClauseKind, FromSqlValue, SqlValue};

use super::Session;
use crate::error::{OrmError, Result};
use crate::record::Record;

/// Column assignments for [`Session::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateArgs {
    /// Column name to new value.
    Map(BTreeMap<String, SqlValue>),
    /// Alternating `column, value, column, value, ...`.
    List(Vec<SqlValue>),
}

impl UpdateArgs {
    /// Normalizes the arguments into a column map.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::InvalidUpdate`] for an empty assignment, an odd
    /// flat list, or a flat-list key that is not text.
    pub fn into_changes(self) -> Result<BTreeMap<String, SqlValue>> {
        let changes = match self {
            Self::Map(map) => map,
            Self::List(list) => {
                if list.len() % 2 != 0 {
                    return Err(OrmError::InvalidUpdate(format!(
                        "expected column/value pairs, got {} items",
                        list.len()
                    )));
                }
                let mut map = BTreeMap::new();
                let mut items = list.into_iter();
                while let (Some(key), Some(value)) = (items.next(), items.next()) {
                    let SqlValue::Text(column) = key else {
                        return Err(OrmError::InvalidUpdate(format!(
                            "column name must be text, got {}",
                            key.type_name()
                        )));
                    };
                    map.insert(column, value);
                }
                map
            }
        };
        if changes.is_empty() {
            return Err(OrmError::InvalidUpdate(String::from("no columns to update")));
        }
        Ok(changes)
    }
}

impl From<BTreeMap<String, SqlValue>> for UpdateArgs {
    fn from(map: BTreeMap<String, SqlValue>) -> Self {
        Self::Map(map)
    }
}

impl From<HashMap<String, SqlValue>> for UpdateArgs {
    fn from(map: HashMap<String, SqlValue>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl From<Vec<SqlValue>> for UpdateArgs {
    fn from(list: Vec<SqlValue>) -> Self {
        Self::List(list)
    }
}

impl Session {
    /// Inserts `records` in one statement and returns the affected row count.
    ///
    /// The before-insert hook runs on every record first; the after-insert
    /// hook runs once the statement succeeded. An empty slice does nothing.
    ///
    /// # Errors
    ///
    /// Returns a hook error or the driver error.
    pub fn insert<R: Record>(&mut self, records: &mut [R]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        self.terminal(|s| s.insert_records(records))
    }

    fn insert_records<R: Record>(&mut self, records: &mut [R]) -> Result<u64> {
        let hooks = R::hooks();
        let table = self.model::<R>().ref_table()?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records.iter_mut() {
            if let Some(hook) = hooks.before_insert {
                self.isolated(|s| hook(&mut *record, s))?;
            }
            rows.push(table.record_values(record));
        }

        self.state.clause.insert(&table.name, &table.field_names);
        self.state.clause.values(rows);
        let (sql, params) = self
            .state
            .clause
            .build(&[ClauseKind::Insert, ClauseKind::Values]);
        let affected = self.raw(&sql, params).exec()?;

        if let Some(hook) = hooks.after_insert {
            self.isolated(hook)?;
        }
        Ok(affected)
    }

    /// Appends every record matching the pending WHERE, ORDER BY and LIMIT
    /// clauses to `out`.
    ///
    /// # Errors
    ///
    /// Returns a hook error, the driver error, or [`OrmError::Value`] when a
    /// column does not convert into its field.
    pub fn find<R: Record>(&mut self, out: &mut Vec<R>) -> Result<()> {
        self.terminal(|s| s.find_records(out))
    }

    fn find_records<R: Record>(&mut self, out: &mut Vec<R>) -> Result<()> {
        let hooks = R::hooks();
        if let Some(hook) = hooks.before_query {
            self.isolated(hook)?;
        }
        let table = self.model::<R>().ref_table()?;

        self.state.clause.select(&table.name, &table.field_names);
        let (sql, params) = self.state.clause.build(&[
            ClauseKind::Select,
            ClauseKind::Where,
            ClauseKind::OrderBy,
            ClauseKind::Limit,
        ]);
        let rows = self.raw(&sql, params).query_rows()?;

        for row in rows.rows {
            if row.len() != table.fields.len() {
                return Err(OrmError::ColumnCount {
                    expected: table.fields.len(),
                    found: row.len(),
                });
            }
            let mut record = R::default();
            for (index, value) in row.into_iter().enumerate() {
                record.set_field(index, value)?;
            }
            if let Some(hook) = hooks.after_query {
                self.isolated(|s| hook(&mut record, s))?;
            }
            out.push(record);
        }
        Ok(())
    }

    /// Returns the first matching record.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::NotFound`] if nothing matches, otherwise as
    /// [`Session::find`].
    pub fn first<R: Record>(&mut self) -> Result<R> {
        let mut out = Vec::with_capacity(1);
        self.limit(1).find(&mut out)?;
        out.into_iter().next().ok_or(OrmError::NotFound)
    }

    /// Updates the rows matching the pending WHERE clause and returns the
    /// affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::InvalidUpdate`] for malformed arguments,
    /// [`OrmError::InvalidField`] for a column outside the current model,
    /// [`OrmError::ModelNotSet`] without a model, a hook error or the driver
    /// error.
    pub fn update(&mut self, args: impl Into<UpdateArgs>) -> Result<u64> {
        let args = args.into();
        self.terminal(|s| s.update_rows(args))
    }

    fn update_rows(&mut self, args: UpdateArgs) -> Result<u64> {
        let table = self.ref_table()?;
        let changes = args.into_changes()?;
        if let Some(column) = changes.keys().find(|c| table.get_field(c).is_none()) {
            return Err(OrmError::InvalidField(column.clone()));
        }

        if let Some(hook) = table.hooks.before_update {
            self.isolated(hook)?;
        }
        self.state.clause.update(&table.name, &changes);
        let (sql, params) = self
            .state
            .clause
            .build(&[ClauseKind::Update, ClauseKind::Where]);
        let affected = self.raw(&sql, params).exec()?;

        if let Some(hook) = table.hooks.after_update {
            self.isolated(hook)?;
        }
        Ok(affected)
    }

    /// Deletes the rows matching the pending WHERE clause and returns the
    /// affected row count.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] without a model, a hook error or the
    /// driver error.
    pub fn delete(&mut self) -> Result<u64> {
        self.terminal(Self::delete_rows)
    }

    fn delete_rows(&mut self) -> Result<u64> {
        let table = self.ref_table()?;
        if let Some(hook) = table.hooks.before_delete {
            self.isolated(hook)?;
        }
        self.state.clause.delete(&table.name);
        let (sql, params) = self
            .state
            .clause
            .build(&[ClauseKind::Delete, ClauseKind::Where]);
        let affected = self.raw(&sql, params).exec()?;

        if let Some(hook) = table.hooks.after_delete {
            self.isolated(hook)?;
        }
        Ok(affected)
    }

    /// Counts the rows matching the pending WHERE clause.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::ModelNotSet`] without a model or the driver error.
    pub fn count(&mut self) -> Result<i64> {
        self.terminal(Self::count_rows)
    }

    fn count_rows(&mut self) -> Result<i64> {
        let table = self.ref_table()?;
        self.state.clause.count(&table.name);
        let (sql, params) = self
            .state
            .clause
            .build(&[ClauseKind::Count, ClauseKind::Where]);
        let row = self.raw(&sql, params).query_row()?;
        match row.and_then(|values| values.into_iter().next()) {
            Some(value) => Ok(i64::from_sql_value(value)?),
            None => Ok(0),
        }
    }

    /// Sets the WHERE clause of the next statement, replacing any previous
    /// one.
    pub fn where_clause(&mut self, condition: &str, args: Vec<SqlValue>) -> &mut Self {
        self.state.clause.where_clause(condition, args);
        self
    }

    /// Sets the ORDER BY clause of the next statement.
    pub fn order_by(&mut self, expr: &str) -> &mut Self {
        self.state.clause.order_by(expr);
        self
    }

    /// Sets the LIMIT clause of the next statement.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.state.clause.limit(n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    #[test]
    fn test_flat_list_becomes_map() {
        let args = vec![text("name"), text("Tom"), text("age"), SqlValue::Int(3)];
        let changes = UpdateArgs::from(args).into_changes().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes["age"], SqlValue::Int(3));
    }

    #[test]
    fn test_odd_flat_list_is_rejected() {
        let err = UpdateArgs::from(vec![text("name")]).into_changes().unwrap_err();
        assert!(matches!(err, OrmError::InvalidUpdate(_)));
    }

    #[test]
    fn test_non_text_key_is_rejected() {
        let err = UpdateArgs::from(vec![SqlValue::Int(1), text("x")])
            .into_changes()
            .unwrap_err();
        assert!(matches!(err, OrmError::InvalidUpdate(_)));
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let err = UpdateArgs::from(BTreeMap::<String, SqlValue>::new()).into_changes().unwrap_err();
        assert!(matches!(err, OrmError::InvalidUpdate(_)));
        let err = UpdateArgs::from(Vec::<SqlValue>::new()).into_changes().unwrap_err();
        assert!(matches!(err, OrmError::InvalidUpdate(_)));
    }
}
