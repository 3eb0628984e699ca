//! Records and their lifecycle hooks.
//!
//! A record is a plain struct mapped onto one table. `#[derive(Record)]`
//! generates the [`Record`] impl: a static [`FieldDef`] table in declaration
//! order plus positional accessors used for INSERT tuples and row scanning.

use std::fmt;

use tabula_core::{ColumnKind, SqlValue, ValueError};

use crate::error::Result;
use crate::session::Session;

/// Static description of one mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Column name.
    pub name: &'static str,
    /// Language-level shape, mapped to a column type by the dialect.
    pub kind: ColumnKind,
    /// Raw constraint text appended to the column definition.
    pub tag: &'static str,
}

/// A struct persisted as rows of one table.
///
/// `Default` supplies the zero-valued record each scanned row is bound into.
pub trait Record: Default + 'static {
    /// Table name.
    const TABLE: &'static str;

    /// Mapped fields, in declaration order.
    const FIELDS: &'static [FieldDef];

    /// Returns the mapped field values, in [`Self::FIELDS`] order.
    fn record_values(&self) -> Vec<SqlValue>;

    /// Assigns the field at `index` in [`Self::FIELDS`].
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] if the value does not convert into the field
    /// type or `index` is out of range.
    fn set_field(&mut self, index: usize, value: SqlValue) -> std::result::Result<(), ValueError>;

    /// Lifecycle hooks. None by default.
    #[must_use]
    fn hooks() -> Hooks<Self> {
        Hooks::new()
    }
}

/// A hook that observes or mutates a single record.
pub type RecordHook<R> = fn(&mut R, &mut Session) -> Result<()>;

/// A hook that runs once per statement.
pub type SessionHook = fn(&mut Session) -> Result<()>;

/// Optional lifecycle hooks of a record type.
///
/// Every hook receives a [`Session`] with a fresh statement state, so it can
/// issue its own queries. Returning an error aborts the surrounding
/// operation.
pub struct Hooks<R> {
    /// Runs on every record before it is inserted.
    pub before_insert: Option<RecordHook<R>>,
    /// Runs once after an INSERT succeeds.
    pub after_insert: Option<SessionHook>,
    /// Runs once before a SELECT.
    pub before_query: Option<SessionHook>,
    /// Runs on every scanned record.
    pub after_query: Option<RecordHook<R>>,
    /// Runs once before an UPDATE.
    pub before_update: Option<SessionHook>,
    /// Runs once after an UPDATE succeeds.
    pub after_update: Option<SessionHook>,
    /// Runs once before a DELETE.
    pub before_delete: Option<SessionHook>,
    /// Runs once after a DELETE succeeds.
    pub after_delete: Option<SessionHook>,
}

impl<R> Hooks<R> {
    /// Creates an empty hook set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            before_insert: None,
            after_insert: None,
            before_query: None,
            after_query: None,
            before_update: None,
            after_update: None,
            before_delete: None,
            after_delete: None,
        }
    }

    /// Sets the before-insert hook.
    #[must_use]
    pub const fn before_insert(mut self, hook: RecordHook<R>) -> Self {
        self.before_insert = Some(hook);
        self
    }

    /// Sets the after-insert hook.
    #[must_use]
    pub const fn after_insert(mut self, hook: SessionHook) -> Self {
        self.after_insert = Some(hook);
        self
    }

    /// Sets the before-query hook.
    #[must_use]
    pub const fn before_query(mut self, hook: SessionHook) -> Self {
        self.before_query = Some(hook);
        self
    }

    /// Sets the after-query hook.
    #[must_use]
    pub const fn after_query(mut self, hook: RecordHook<R>) -> Self {
        self.after_query = Some(hook);
        self
    }

    /// Sets the before-update hook.
    #[must_use]
    pub const fn before_update(mut self, hook: SessionHook) -> Self {
        self.before_update = Some(hook);
        self
    }

    /// Sets the after-update hook.
    #[must_use]
    pub const fn after_update(mut self, hook: SessionHook) -> Self {
        self.after_update = Some(hook);
        self
    }

    /// Sets the before-delete hook.
    #[must_use]
    pub const fn before_delete(mut self, hook: SessionHook) -> Self {
        self.before_delete = Some(hook);
        self
    }

    /// Sets the after-delete hook.
    #[must_use]
    pub const fn after_delete(mut self, hook: SessionHook) -> Self {
        self.after_delete = Some(hook);
        self
    }

    /// Returns the statement-level hooks, which do not depend on `R`.
    #[must_use]
    pub const fn statement(&self) -> StatementHooks {
        StatementHooks {
            after_insert: self.after_insert,
            before_query: self.before_query,
            before_update: self.before_update,
            after_update: self.after_update,
            before_delete: self.before_delete,
            after_delete: self.after_delete,
        }
    }
}

impl<R> Default for Hooks<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Hooks<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Hooks<R> {}

impl<R> fmt::Debug for Hooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_insert", &self.before_insert.is_some())
            .field("after_query", &self.after_query.is_some())
            .field("statement", &self.statement())
            .finish()
    }
}

/// The record-independent subset of [`Hooks`], cached with the table schema
/// so UPDATE and DELETE can run them without knowing the record type.
#[derive(Clone, Copy, Default)]
pub struct StatementHooks {
    /// See [`Hooks::after_insert`].
    pub after_insert: Option<SessionHook>,
    /// See [`Hooks::before_query`].
    pub before_query: Option<SessionHook>,
    /// See [`Hooks::before_update`].
    pub before_update: Option<SessionHook>,
    /// See [`Hooks::after_update`].
    pub after_update: Option<SessionHook>,
    /// See [`Hooks::before_delete`].
    pub before_delete: Option<SessionHook>,
    /// See [`Hooks::after_delete`].
    pub after_delete: Option<SessionHook>,
}

impl fmt::Debug for StatementHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementHooks")
            .field("after_insert", &self.after_insert.is_some())
            .field("before_query", &self.before_query.is_some())
            .field("before_update", &self.before_update.is_some())
            .field("after_update", &self.after_update.is_some())
            .field("before_delete", &self.before_delete.is_some())
            .field("after_delete", &self.after_delete.is_some())
            .finish()
    }
}
