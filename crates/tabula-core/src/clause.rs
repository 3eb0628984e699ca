//! Clause-composition statement builder.
//!
//! A [`Clause`] accumulates one SQL fragment per [`ClauseKind`], each with
//! its own ordered parameter list. [`Clause::build`] then stitches together
//! exactly the requested kinds, in the requested order, so positional `?`
//! placeholders line up with the concatenated parameters.
//!
//! ```rust
//! use tabula_core::clause::{Clause, ClauseKind};
//! use tabula_core::value::{SqlValue, ToSqlValue};
//!
//! let mut clause = Clause::new();
//! clause.select("User", &["Name", "Age"]);
//! clause.limit(3);
//! clause.where_clause("Name = ?", vec!["Tom".to_sql_value()]);
//! clause.order_by("Age ASC");
//!
//! let (sql, params) = clause.build(&[
//!     ClauseKind::Select,
//!     ClauseKind::Where,
//!     ClauseKind::OrderBy,
//!     ClauseKind::Limit,
//! ]);
//! assert_eq!(sql, "SELECT Name,Age FROM User WHERE Name = ? ORDER BY Age ASC LIMIT ?");
//! assert_eq!(params, vec!["Tom".to_sql_value(), SqlValue::Int(3)]);
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::value::SqlValue;

/// The fixed set of clause kinds a statement is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClauseKind {
    /// `INSERT INTO t (c1,c2)`
    Insert,
    /// `VALUES (?, ?), (?, ?)`
    Values,
    /// `SELECT c1,c2 FROM t`
    Select,
    /// `LIMIT ?`
    Limit,
    /// `WHERE <condition>`
    Where,
    /// `ORDER BY <expression>`
    OrderBy,
    /// `UPDATE t SET c1 = ?, ...`
    Update,
    /// `DELETE FROM t`
    Delete,
    /// `SELECT count(*) FROM t`
    Count,
}

/// One rendered clause: SQL text plus the parameters its placeholders bind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// SQL text of the clause.
    pub sql: String,
    /// Parameters, in placeholder order.
    pub params: Vec<SqlValue>,
}

impl Fragment {
    /// Creates a fragment without parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    #[must_use]
    pub fn with_params(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Accumulator of clause fragments, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    fragments: HashMap<ClauseKind, Fragment>,
}

impl Clause {
    /// Creates an empty clause accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `fragment` for `kind`, overwriting any previous fragment.
    pub fn set(&mut self, kind: ClauseKind, fragment: Fragment) {
        self.fragments.insert(kind, fragment);
    }

    /// Returns the fragment stored for `kind`.
    #[must_use]
    pub fn get(&self, kind: ClauseKind) -> Option<&Fragment> {
        self.fragments.get(&kind)
    }

    /// Returns whether a fragment is stored for `kind`.
    #[must_use]
    pub fn is_set(&self, kind: ClauseKind) -> bool {
        self.fragments.contains_key(&kind)
    }

    /// Removes every fragment.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Sets the INSERT clause.
    pub fn insert(&mut self, table: &str, columns: &[impl AsRef<str>]) {
        self.set(ClauseKind::Insert, insert(table, columns));
    }

    /// Sets the VALUES clause, one tuple per row.
    pub fn values(&mut self, rows: Vec<Vec<SqlValue>>) {
        self.set(ClauseKind::Values, values(rows));
    }

    /// Sets the SELECT clause.
    pub fn select(&mut self, table: &str, columns: &[impl AsRef<str>]) {
        self.set(ClauseKind::Select, select(table, columns));
    }

    /// Sets the LIMIT clause.
    pub fn limit(&mut self, n: i64) {
        self.set(ClauseKind::Limit, limit(n));
    }

    /// Sets the WHERE clause.
    pub fn where_clause(&mut self, condition: &str, args: Vec<SqlValue>) {
        self.set(ClauseKind::Where, where_clause(condition, args));
    }

    /// Sets the ORDER BY clause.
    pub fn order_by(&mut self, expr: &str) {
        self.set(ClauseKind::OrderBy, order_by(expr));
    }

    /// Sets the UPDATE clause. Columns are emitted in key order.
    pub fn update(&mut self, table: &str, changes: &BTreeMap<String, SqlValue>) {
        self.set(ClauseKind::Update, update(table, changes));
    }

    /// Sets the DELETE clause.
    pub fn delete(&mut self, table: &str) {
        self.set(ClauseKind::Delete, delete(table));
    }

    /// Sets the COUNT clause.
    pub fn count(&mut self, table: &str) {
        self.set(ClauseKind::Count, count(table));
    }

    /// Returns the stored fragments for `kinds`, in that order, skipping
    /// kinds that were never set.
    #[must_use]
    pub fn fragments(&self, kinds: &[ClauseKind]) -> Vec<&Fragment> {
        kinds
            .iter()
            .filter_map(|kind| self.fragments.get(kind))
            .collect()
    }

    /// Renders the requested kinds into one SQL string and one parameter
    /// list.
    ///
    /// Fragments are joined with a single space. The caller chooses an order
    /// that yields valid SQL, e.g. SELECT, WHERE, ORDER BY, LIMIT.
    #[must_use]
    pub fn build(&self, kinds: &[ClauseKind]) -> (String, Vec<SqlValue>) {
        let parts = self.fragments(kinds);
        let sql = parts
            .iter()
            .map(|f| f.sql.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let params = parts
            .into_iter()
            .flat_map(|f| f.params.iter().cloned())
            .collect();
        (sql, params)
    }
}

fn join_columns(columns: &[impl AsRef<str>]) -> String {
    columns
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<&str>>()
        .join(",")
}

fn bind_vars(n: usize) -> String {
    vec![SqlValue::placeholder(); n].join(", ")
}

fn insert(table: &str, columns: &[impl AsRef<str>]) -> Fragment {
    Fragment::new(format!("INSERT INTO {table} ({})", join_columns(columns)))
}

fn values(rows: Vec<Vec<SqlValue>>) -> Fragment {
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| format!("({})", bind_vars(row.len())))
        .collect();
    let params = rows.into_iter().flatten().collect();
    Fragment::with_params(format!("VALUES {}", tuples.join(", ")), params)
}

fn select(table: &str, columns: &[impl AsRef<str>]) -> Fragment {
    Fragment::new(format!("SELECT {} FROM {table}", join_columns(columns)))
}

fn limit(n: i64) -> Fragment {
    Fragment::with_params("LIMIT ?", vec![SqlValue::Int(n)])
}

fn where_clause(condition: &str, args: Vec<SqlValue>) -> Fragment {
    Fragment::with_params(format!("WHERE {condition}"), args)
}

fn order_by(expr: &str) -> Fragment {
    Fragment::new(format!("ORDER BY {expr}"))
}

fn update(table: &str, changes: &BTreeMap<String, SqlValue>) -> Fragment {
    let assignments: Vec<String> = changes.keys().map(|k| format!("{k} = ?")).collect();
    Fragment::with_params(
        format!("UPDATE {table} SET {}", assignments.join(", ")),
        changes.values().cloned().collect(),
    )
}

fn delete(table: &str) -> Fragment {
    Fragment::new(format!("DELETE FROM {table}"))
}

fn count(table: &str) -> Fragment {
    Fragment::new(format!("SELECT count(*) FROM {table}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(String::from(s))
    }

    #[test]
    fn test_insert_values_two_rows() {
        let mut clause = Clause::new();
        clause.insert("User", &["Name", "Age"]);
        clause.values(vec![
            vec![text("Tom"), SqlValue::Int(18)],
            vec![text("Sam"), SqlValue::Int(25)],
        ]);
        let (sql, params) = clause.build(&[ClauseKind::Insert, ClauseKind::Values]);
        assert_eq!(sql, "INSERT INTO User (Name,Age) VALUES (?, ?), (?, ?)");
        assert_eq!(
            params,
            vec![text("Tom"), SqlValue::Int(18), text("Sam"), SqlValue::Int(25)]
        );
    }

    #[test]
    fn test_select_with_all_modifiers() {
        let mut clause = Clause::new();
        clause.limit(3);
        clause.select("User", &["Name"]);
        clause.where_clause("Name = ?", vec![text("Tom")]);
        clause.order_by("Age ASC");
        let (sql, params) = clause.build(&[
            ClauseKind::Select,
            ClauseKind::Where,
            ClauseKind::OrderBy,
            ClauseKind::Limit,
        ]);
        assert_eq!(
            sql,
            "SELECT Name FROM User WHERE Name = ? ORDER BY Age ASC LIMIT ?"
        );
        assert_eq!(params, vec![text("Tom"), SqlValue::Int(3)]);
    }

    #[test]
    fn test_unset_kinds_contribute_nothing() {
        let mut clause = Clause::new();
        clause.select("User", &["Name", "Age"]);
        let (sql, params) = clause.build(&[
            ClauseKind::Select,
            ClauseKind::Where,
            ClauseKind::OrderBy,
            ClauseKind::Limit,
        ]);
        assert_eq!(sql, "SELECT Name,Age FROM User");
        assert!(params.is_empty());
    }

    #[test]
    fn test_set_overwrites() {
        let mut clause = Clause::new();
        clause.where_clause("Age > ?", vec![SqlValue::Int(10)]);
        clause.where_clause("Name = ?", vec![text("Tom")]);
        let (sql, params) = clause.build(&[ClauseKind::Where]);
        assert_eq!(sql, "WHERE Name = ?");
        assert_eq!(params, vec![text("Tom")]);
    }

    #[test]
    fn test_build_follows_requested_order() {
        let mut clause = Clause::new();
        clause.where_clause("Age > ?", vec![SqlValue::Int(10)]);
        clause.limit(5);
        let (_, params) = clause.build(&[ClauseKind::Limit, ClauseKind::Where]);
        assert_eq!(params, vec![SqlValue::Int(5), SqlValue::Int(10)]);
    }

    #[test]
    fn test_update_sorts_columns() {
        let mut changes = BTreeMap::new();
        changes.insert(String::from("Name"), text("Tom"));
        changes.insert(String::from("Age"), SqlValue::Int(30));
        let mut clause = Clause::new();
        clause.update("User", &changes);
        clause.where_clause("Name = ?", vec![text("Sam")]);
        let (sql, params) = clause.build(&[ClauseKind::Update, ClauseKind::Where]);
        assert_eq!(sql, "UPDATE User SET Age = ?, Name = ? WHERE Name = ?");
        assert_eq!(params, vec![SqlValue::Int(30), text("Tom"), text("Sam")]);
    }

    #[test]
    fn test_delete_and_count() {
        let mut clause = Clause::new();
        clause.delete("User");
        clause.count("User");
        assert_eq!(clause.build(&[ClauseKind::Delete]).0, "DELETE FROM User");
        assert_eq!(
            clause.build(&[ClauseKind::Count]).0,
            "SELECT count(*) FROM User"
        );
    }

    #[test]
    fn test_clear() {
        let mut clause = Clause::new();
        clause.delete("User");
        clause.clear();
        assert!(!clause.is_set(ClauseKind::Delete));
        assert_eq!(clause.build(&[ClauseKind::Delete]), (String::new(), vec![]));
    }
}
