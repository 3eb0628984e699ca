//! Cross-dialect checks: both built-in dialects are total over the kinds
//! they support and diverge where the backends diverge.

use std::panic;

use tabula_core::{ColumnKind, Dialect, DialectRegistry, PostgresDialect, SqliteDialect};

#[test]
fn test_mapping_is_deterministic() {
    let registry = DialectRegistry::with_builtin();
    for name in ["sqlite3", "postgres"] {
        let dialect = registry.get(name).unwrap();
        for kind in ColumnKind::ALL {
            assert_eq!(dialect.type_name(kind), dialect.type_name(kind));
        }
    }
}

#[test]
fn test_dialects_diverge_on_types() {
    let sqlite = SqliteDialect::new();
    let postgres = PostgresDialect::new();
    assert_ne!(
        sqlite.data_type_of(ColumnKind::Float),
        postgres.data_type_of(ColumnKind::Float)
    );
    assert_ne!(
        sqlite.data_type_of(ColumnKind::Blob),
        postgres.data_type_of(ColumnKind::Blob)
    );
    assert_eq!(
        sqlite.data_type_of(ColumnKind::Text),
        postgres.data_type_of(ColumnKind::Text)
    );
}

#[test]
fn test_dialects_diverge_on_existence_check() {
    let (sqlite_sql, _) = SqliteDialect::new().table_exist_sql("User");
    let (postgres_sql, _) = PostgresDialect::new().table_exist_sql("User");
    assert_ne!(sqlite_sql, postgres_sql);
}

#[test]
fn test_unsupported_kind_always_fails_the_same_way() {
    let first = panic::catch_unwind(|| SqliteDialect::new().data_type_of(ColumnKind::Json))
        .unwrap_err();
    let second = panic::catch_unwind(|| SqliteDialect::new().data_type_of(ColumnKind::Json))
        .unwrap_err();
    let first = first.downcast_ref::<String>().unwrap();
    let second = second.downcast_ref::<String>().unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "invalid sql type json for dialect sqlite3");
}
