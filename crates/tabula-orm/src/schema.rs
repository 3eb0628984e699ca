//! Table schemas derived from record descriptors.

use std::any::TypeId;
use std::collections::HashMap;

use tabula_core::{Dialect, SqlValue};
use tracing::debug;

use crate::record::{Record, StatementHooks};

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Dialect column type.
    pub data_type: String,
    /// Raw constraint text.
    pub tag: String,
}

impl Field {
    /// Renders the column definition used by `CREATE TABLE`.
    #[must_use]
    pub fn definition(&self) -> String {
        if self.tag.is_empty() {
            format!("{} {}", self.name, self.data_type)
        } else {
            format!("{} {} {}", self.name, self.data_type, self.tag)
        }
    }
}

/// The schema of a record type, resolved against one dialect.
#[derive(Debug, Clone)]
pub struct TableSchema {
    model: TypeId,
    /// Table name.
    pub name: String,
    /// Mapped columns, in declaration order.
    pub fields: Vec<Field>,
    /// Column names, in declaration order.
    pub field_names: Vec<String>,
    field_index: HashMap<String, usize>,
    /// Statement-level hooks of the record type.
    pub hooks: StatementHooks,
}

impl TableSchema {
    /// Builds the schema of `R` using `dialect` for column types.
    ///
    /// # Panics
    ///
    /// Panics if a field kind has no column type in `dialect`.
    #[must_use]
    pub fn parse<R: Record>(dialect: &dyn Dialect) -> Self {
        let mut fields = Vec::with_capacity(R::FIELDS.len());
        let mut field_names = Vec::with_capacity(R::FIELDS.len());
        let mut field_index = HashMap::with_capacity(R::FIELDS.len());

        for (index, def) in R::FIELDS.iter().enumerate() {
            fields.push(Field {
                name: def.name.to_string(),
                data_type: dialect.data_type_of(def.kind).to_string(),
                tag: def.tag.to_string(),
            });
            field_names.push(def.name.to_string());
            field_index.insert(def.name.to_string(), index);
        }

        debug!(
            table = R::TABLE,
            dialect = dialect.name(),
            fields = fields.len(),
            "Parsed table schema"
        );

        Self {
            model: TypeId::of::<R>(),
            name: R::TABLE.to_string(),
            fields,
            field_names,
            field_index,
            hooks: R::hooks().statement(),
        }
    }

    /// Renders the `CREATE TABLE` statement of this schema.
    #[must_use]
    pub fn create_table_sql(&self) -> String {
        let columns: Vec<String> = self.fields.iter().map(Field::definition).collect();
        format!("CREATE TABLE {} ({})", self.name, columns.join(","))
    }

    /// Looks a field up by column name.
    #[must_use]
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns the values of `record` in field order.
    #[must_use]
    pub fn record_values<R: Record>(&self, record: &R) -> Vec<SqlValue> {
        record.record_values()
    }

    /// Returns whether this schema was parsed from `R`.
    #[must_use]
    pub fn is_model<R: 'static>(&self) -> bool {
        self.model == TypeId::of::<R>()
    }
}

#[cfg(test)]
mod tests {
    use tabula_core::{PostgresDialect, SqliteDialect};

    use super::*;

    #[allow(dead_code)]
    #[derive(Debug, Default, tabula_derive::Record)]
    struct User {
        #[record(tag = "PRIMARY KEY")]
        pub name: String,
        pub age: i32,
        pub score: f64,
        #[record(skip)]
        pub cache: String,
        secret: String,
    }

    #[allow(dead_code)]
    #[derive(Debug, Default, tabula_derive::Record)]
    #[record(table = "audit_log")]
    struct Audit {
        pub id: i64,
        pub payload: Vec<u8>,
    }

    #[test]
    fn test_parse_keeps_declaration_order() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        assert_eq!(schema.name, "User");
        assert_eq!(schema.field_names, vec!["name", "age", "score"]);
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[0].tag, "PRIMARY KEY");
        assert_eq!(schema.fields[1].data_type, "integer");
        assert_eq!(schema.fields[2].data_type, "real");
    }

    #[test]
    fn test_parse_excludes_unmapped_fields() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        assert!(schema.get_field("cache").is_none());
        assert!(schema.get_field("secret").is_none());
        assert_eq!(schema.get_field("age").map(|f| f.name.as_str()), Some("age"));
    }

    #[test]
    fn test_parse_uses_dialect_types() {
        let schema = TableSchema::parse::<Audit>(&PostgresDialect::new());
        assert_eq!(schema.name, "audit_log");
        assert_eq!(schema.fields[0].data_type, "bigint");
        assert_eq!(schema.fields[1].data_type, "bytea");
    }

    #[test]
    fn test_record_values_in_field_order() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        let user = User {
            name: String::from("Tom"),
            age: 18,
            score: 1.5,
            ..User::default()
        };
        assert_eq!(
            schema.record_values(&user),
            vec![
                SqlValue::Text(String::from("Tom")),
                SqlValue::Int(18),
                SqlValue::Float(1.5),
            ]
        );
    }

    #[test]
    fn test_is_model() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        assert!(schema.is_model::<User>());
        assert!(!schema.is_model::<Audit>());
    }

    #[test]
    fn test_field_definition() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        assert_eq!(schema.fields[0].definition(), "name text PRIMARY KEY");
        assert_eq!(schema.fields[1].definition(), "age integer");
    }

    #[test]
    fn test_create_table_sql() {
        let schema = TableSchema::parse::<User>(&SqliteDialect::new());
        assert_eq!(
            schema.create_table_sql(),
            "CREATE TABLE User (name text PRIMARY KEY,age integer,score real)"
        );
    }
}
