//! Migrating a table to the current shape of its record.
//!
//! A migration compares the columns a record declares with the columns of
//! the live table. Missing tables are created. New columns are added with
//! `ALTER TABLE .. ADD COLUMN`. If any live column is no longer declared, the
//! table is rebuilt from the declared columns and renamed into place. All
//! statements run in one transaction.

use serde::Serialize;
use tabula_orm::{Engine, Record, Session};
use tracing::{debug, info};

use crate::diff::ColumnDiff;
use crate::error::{MigrateError, Result};

/// What a migration did, or would do in dry-run mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationPlan {
    /// Table name.
    pub table: String,
    /// Whether the table did not exist and is created.
    pub created: bool,
    /// Columns added.
    pub added: Vec<String>,
    /// Columns removed.
    pub removed: Vec<String>,
    /// Statements, in execution order.
    pub statements: Vec<String>,
}

impl MigrationPlan {
    /// Returns `true` if the table already matches the record.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Migrates tables of an engine.
#[derive(Debug, Clone)]
pub struct Migrator {
    engine: Engine,
    dry_run: bool,
}

impl Migrator {
    /// Creates a migrator for `engine`.
    #[must_use]
    pub const fn new(engine: Engine) -> Self {
        Self {
            engine,
            dry_run: false,
        }
    }

    /// Enables dry-run mode: plans are computed but nothing is executed.
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Brings the table of `R` in line with its declared fields.
    ///
    /// # Errors
    ///
    /// Returns [`MigrateError::NoColumns`] for a record without mapped
    /// fields, or the first failing step. A failure rolls every earlier step
    /// back.
    pub fn migrate<R: Record>(&self) -> Result<MigrationPlan> {
        if self.dry_run {
            let plan = plan::<R>(&mut self.engine.new_session())?;
            info!(
                table = %plan.table,
                statements = plan.statements.len(),
                "Dry run - statements not executed"
            );
            return Ok(plan);
        }

        self.engine.transaction(|session| {
            let plan = plan::<R>(session)?;
            for sql in &plan.statements {
                info!(table = %plan.table, sql = %sql, "Applying");
                session.raw(sql, Vec::new()).exec()?;
            }
            if plan.is_noop() {
                debug!(table = %plan.table, "Table is up to date");
            }
            Ok(plan)
        })
    }
}

/// Computes the statements migrating the table of `R`.
///
/// # Errors
///
/// Returns [`MigrateError::NoColumns`] for a record without mapped fields, or
/// the error of an existence or column probe.
pub fn plan<R: Record>(session: &mut Session) -> Result<MigrationPlan> {
    let table = session.model::<R>().ref_table()?;
    if table.fields.is_empty() {
        return Err(MigrateError::NoColumns(table.name.clone()));
    }

    let mut plan = MigrationPlan {
        table: table.name.clone(),
        ..MigrationPlan::default()
    };

    if !session.table_exists(&table.name)? {
        info!(table = %table.name, "Table does not exist");
        plan.created = true;
        plan.statements.push(table.create_table_sql());
        return Ok(plan);
    }

    let live = session.table_columns(&table.name)?;
    let ColumnDiff { added, removed } = ColumnDiff::between(&table.field_names, &live);
    info!(table = %table.name, ?added, ?removed, "Compared columns");

    for column in &added {
        if let Some(field) = table.get_field(column) {
            plan.statements.push(format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                table.name, field.name, field.data_type
            ));
        }
    }

    if !removed.is_empty() {
        let tmp = format!("tmp_{}", table.name);
        plan.statements.push(format!(
            "CREATE TABLE {tmp} AS SELECT {} FROM {}",
            table.field_names.join(", "),
            table.name
        ));
        plan.statements.push(format!("DROP TABLE {}", table.name));
        plan.statements
            .push(format!("ALTER TABLE {tmp} RENAME TO {}", table.name));
    }

    plan.added = added;
    plan.removed = removed;
    Ok(plan)
}

/// Migrates the table of `R` on `engine`.
///
/// # Errors
///
/// As [`Migrator::migrate`].
pub fn migrate<R: Record>(engine: &Engine) -> Result<MigrationPlan> {
    Migrator::new(engine.clone()).migrate::<R>()
}
