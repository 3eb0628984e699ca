//! Lifecycle hooks: ordering, mutation, nested queries and error propagation.

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use tabula_orm::core::{FromSqlValue, SqlValue, ToSqlValue};
use tabula_orm::{Engine, Hooks, OrmError, Record, Session};

// =============================================================================
// Record-level hooks mutate the record
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(table = "accounts", hooks = account_hooks)]
pub struct Account {
    #[record(tag = "PRIMARY KEY")]
    pub id: i64,
    pub owner: String,
}

fn account_hooks() -> Hooks<Account> {
    Hooks::<Account>::new()
        .before_insert(|account, _| {
            account.owner = account.owner.to_uppercase();
            Ok(())
        })
        .after_query(|account, _| {
            account.owner.push('!');
            Ok(())
        })
}

#[test]
fn test_record_hooks_mutate() {
    let engine = Engine::new("sqlite3", ":memory:").unwrap();
    let mut session = engine.new_session();
    session.model::<Account>().create_table().unwrap();

    let mut accounts = [Account {
        id: 1,
        owner: String::from("tom"),
    }];
    session.insert(&mut accounts).unwrap();
    assert_eq!(accounts[0].owner, "TOM", "before-insert sees the caller's record");

    let stored = session
        .raw("SELECT owner FROM accounts", Vec::new())
        .query_row()
        .unwrap()
        .unwrap();
    assert_eq!(stored, vec!["TOM".to_sql_value()]);

    let account: Account = session.first().unwrap();
    assert_eq!(account.owner, "TOM!");
}

// =============================================================================
// Statement-level hooks issue their own queries
// =============================================================================

static ROWS_SEEN_AFTER_INSERT: AtomicI64 = AtomicI64::new(-1);
static ROWS_SEEN_BEFORE_QUERY: AtomicI64 = AtomicI64::new(-1);

#[derive(Debug, Default, Record)]
#[record(table = "events", hooks = event_hooks)]
pub struct Event {
    pub name: String,
}

fn count_events(session: &mut Session) -> tabula_orm::Result<i64> {
    let row = session
        .raw("SELECT count(*) FROM events", Vec::new())
        .query_row()?
        .unwrap_or_default();
    Ok(i64::from_sql_value(
        row.into_iter().next().unwrap_or(SqlValue::Null),
    )?)
}

fn event_hooks() -> Hooks<Event> {
    Hooks::new()
        .after_insert(|session| {
            ROWS_SEEN_AFTER_INSERT.store(count_events(session)?, Ordering::SeqCst);
            Ok(())
        })
        .before_query(|session| {
            ROWS_SEEN_BEFORE_QUERY.store(count_events(session)?, Ordering::SeqCst);
            Ok(())
        })
}

#[test]
fn test_hooks_do_not_disturb_statement() {
    let engine = Engine::new("sqlite3", ":memory:").unwrap();
    let mut session = engine.new_session();
    session.model::<Event>().create_table().unwrap();

    let mut events = [
        Event {
            name: String::from("a"),
        },
        Event {
            name: String::from("b"),
        },
    ];
    session.insert(&mut events).unwrap();
    assert_eq!(ROWS_SEEN_AFTER_INSERT.load(Ordering::SeqCst), 2);

    let mut found: Vec<Event> = Vec::new();
    session
        .where_clause("name = ?", vec!["b".to_sql_value()])
        .find(&mut found)
        .unwrap();
    assert_eq!(ROWS_SEEN_BEFORE_QUERY.load(Ordering::SeqCst), 2);
    assert_eq!(found.len(), 1, "the WHERE clause survives the hook");
    assert_eq!(found[0].name, "b");
}

// =============================================================================
// Update and delete hooks bracket the statement
// =============================================================================

static UPDATE_CALLS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Default, Record)]
#[record(table = "notes", hooks = note_hooks)]
pub struct Note {
    pub body: String,
}

fn note_hooks() -> Hooks<Note> {
    Hooks::new()
        .before_update(|_| {
            UPDATE_CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .after_update(|_| {
            UPDATE_CALLS.fetch_add(10, Ordering::SeqCst);
            Ok(())
        })
        .before_delete(|_| Err(OrmError::InvalidUpdate(String::from("notes are permanent"))))
}

#[test]
fn test_update_hooks_and_failing_delete_hook() {
    let engine = Engine::new("sqlite3", ":memory:").unwrap();
    let mut session = engine.new_session();
    session.model::<Note>().create_table().unwrap();
    session
        .insert(&mut [Note {
            body: String::from("x"),
        }])
        .unwrap();

    session
        .update(vec!["body".to_sql_value(), "y".to_sql_value()])
        .unwrap();
    assert_eq!(UPDATE_CALLS.load(Ordering::SeqCst), 11);

    let err = session.delete().unwrap_err();
    assert!(matches!(err, OrmError::InvalidUpdate(_)));
    assert_eq!(session.count().unwrap(), 1, "delete aborted by its hook");
}

// =============================================================================
// A failing before-insert hook aborts the insert
// =============================================================================

#[derive(Debug, Default, Record)]
#[record(table = "guarded", hooks = guarded_hooks)]
pub struct Guarded {
    pub value: i64,
}

fn guarded_hooks() -> Hooks<Guarded> {
    Hooks::new().before_insert(|record, _| {
        if record.value < 0 {
            Err(OrmError::InvalidField(String::from("value")))
        } else {
            Ok(())
        }
    })
}

#[test]
fn test_before_insert_error_aborts() {
    let engine = Engine::new("sqlite3", ":memory:").unwrap();
    let mut session = engine.new_session();
    session.model::<Guarded>().create_table().unwrap();

    let err = session
        .insert(&mut [Guarded { value: 1 }, Guarded { value: -1 }])
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidField(_)));
    assert_eq!(session.count().unwrap(), 0);
}
