//! Migration scenarios against SQLite.
//!
//! Each version of a record below maps onto the same `users` table, standing
//! in for a struct that changed between releases.

use tabula_migrate::{migrate, MigrateError, Migrator};
use tabula_orm::core::ToSqlValue;
use tabula_orm::{Engine, OrmError, Record};

#[derive(Debug, Default, Record)]
#[record(table = "users")]
pub struct UserV1 {
    #[record(tag = "PRIMARY KEY")]
    pub name: String,
    pub age: i64,
}

#[derive(Debug, Default, Record)]
#[record(table = "users")]
pub struct UserV2 {
    #[record(tag = "PRIMARY KEY")]
    pub name: String,
    pub age: i64,
    pub email: String,
}

#[derive(Debug, Default, Record)]
#[record(table = "users")]
pub struct UserV3 {
    #[record(tag = "PRIMARY KEY")]
    pub name: String,
    pub email: String,
}

#[allow(dead_code)]
#[derive(Debug, Default, Record)]
#[record(table = "empty")]
pub struct Nothing {
    hidden: i64,
}

fn engine() -> Engine {
    Engine::new("sqlite3", ":memory:").unwrap()
}

fn columns(engine: &Engine) -> Vec<String> {
    engine.new_session().table_columns("users").unwrap()
}

fn seed_v1(engine: &Engine) {
    migrate::<UserV1>(engine).unwrap();
    engine
        .new_session()
        .insert(&mut [
            UserV1 {
                name: String::from("Tom"),
                age: 18,
            },
            UserV1 {
                name: String::from("Sam"),
                age: 25,
            },
        ])
        .unwrap();
}

// =============================================================================
// Create
// =============================================================================

#[test]
fn test_missing_table_is_created() {
    let engine = engine();
    let plan = migrate::<UserV1>(&engine).unwrap();
    assert!(plan.created);
    assert_eq!(
        plan.statements,
        vec!["CREATE TABLE users (name text PRIMARY KEY,age bigint)"]
    );
    assert_eq!(columns(&engine), vec!["name", "age"]);
}

#[test]
fn test_migration_is_idempotent() {
    let engine = engine();
    migrate::<UserV1>(&engine).unwrap();
    let plan = migrate::<UserV1>(&engine).unwrap();
    assert!(!plan.created);
    assert!(plan.is_noop());
    assert!(plan.added.is_empty());
    assert!(plan.removed.is_empty());
}

#[test]
fn test_record_without_columns() {
    let engine = engine();
    let err = migrate::<Nothing>(&engine).unwrap_err();
    assert!(matches!(err, MigrateError::NoColumns(ref t) if t == "empty"));
}

// =============================================================================
// Add and remove columns
// =============================================================================

#[test]
fn test_added_column() {
    let engine = engine();
    seed_v1(&engine);

    let plan = migrate::<UserV2>(&engine).unwrap();
    assert_eq!(plan.added, vec!["email"]);
    assert!(plan.removed.is_empty());
    assert_eq!(
        plan.statements,
        vec!["ALTER TABLE users ADD COLUMN email text"]
    );
    assert_eq!(columns(&engine), vec!["name", "age", "email"]);

    let mut session = engine.new_session();
    assert_eq!(session.model::<UserV2>().count().unwrap(), 2);
}

#[test]
fn test_removed_column_recreates_table() {
    let engine = engine();
    seed_v1(&engine);
    migrate::<UserV2>(&engine).unwrap();
    engine
        .new_session()
        .model::<UserV2>()
        .where_clause("name = ?", vec!["Tom".to_sql_value()])
        .update(vec!["email".to_sql_value(), "tom@example.com".to_sql_value()])
        .unwrap();

    let plan = migrate::<UserV3>(&engine).unwrap();
    assert!(plan.added.is_empty());
    assert_eq!(plan.removed, vec!["age"]);
    assert_eq!(
        plan.statements,
        vec![
            "CREATE TABLE tmp_users AS SELECT name, email FROM users",
            "DROP TABLE users",
            "ALTER TABLE tmp_users RENAME TO users",
        ]
    );
    assert_eq!(columns(&engine), vec!["name", "email"]);

    let tom: UserV3 = engine
        .new_session()
        .where_clause("name = ?", vec!["Tom".to_sql_value()])
        .first()
        .unwrap();
    assert_eq!(tom.email, "tom@example.com");
}

#[test]
fn test_add_and_remove_in_one_migration() {
    let engine = engine();
    seed_v1(&engine);

    let plan = migrate::<UserV3>(&engine).unwrap();
    assert_eq!(plan.added, vec!["email"]);
    assert_eq!(plan.removed, vec!["age"]);
    assert_eq!(plan.statements.len(), 4);
    assert_eq!(columns(&engine), vec!["name", "email"]);
    assert_eq!(engine.new_session().model::<UserV3>().count().unwrap(), 2);
}

#[test]
fn test_failing_step_rolls_back_earlier_steps() {
    let engine = engine();
    seed_v1(&engine);
    engine
        .new_session()
        .raw("CREATE TABLE tmp_users (name text)", Vec::new())
        .exec()
        .unwrap();

    let err = migrate::<UserV3>(&engine).unwrap_err();
    assert!(matches!(err, MigrateError::Orm(OrmError::Database(_))));
    assert_eq!(columns(&engine), vec!["name", "age"]);
    assert_eq!(engine.new_session().model::<UserV1>().count().unwrap(), 2);
    assert!(engine.new_session().table_exists("tmp_users").unwrap());
}

// =============================================================================
// Dry run
// =============================================================================

#[test]
fn test_dry_run_executes_nothing() {
    let engine = engine();
    seed_v1(&engine);

    let migrator = Migrator::new(engine.clone()).dry_run(true);
    let plan = migrator.migrate::<UserV3>().unwrap();
    assert_eq!(plan.statements.len(), 4);
    assert_eq!(columns(&engine), vec!["name", "age"]);

    let fresh = Engine::new("sqlite3", ":memory:").unwrap();
    let plan = Migrator::new(fresh).dry_run(true).migrate::<UserV1>().unwrap();
    assert!(plan.created);
}

#[test]
fn test_dry_run_on_missing_table_creates_nothing() {
    let engine = engine();
    Migrator::new(engine.clone())
        .dry_run(true)
        .migrate::<UserV1>()
        .unwrap();
    assert!(!engine.new_session().table_exists("users").unwrap());
}

// =============================================================================
// File-backed database
// =============================================================================

#[test]
fn test_migration_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("app.db").to_string_lossy().into_owned();

    let engine = Engine::new("sqlite3", &source).unwrap();
    seed_v1(&engine);
    engine.close().unwrap();

    let engine = Engine::new("sqlite3", &source).unwrap();
    let plan = migrate::<UserV2>(&engine).unwrap();
    assert_eq!(plan.added, vec!["email"]);
    engine.close().unwrap();

    let engine = Engine::new("sqlite3", &source).unwrap();
    assert!(migrate::<UserV2>(&engine).unwrap().is_noop());
}
