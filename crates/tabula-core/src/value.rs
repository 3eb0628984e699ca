//! SQL values and conversions between Rust types and statement parameters.
//!
//! Every parameter bound into a statement and every value scanned out of a
//! result row travels as a [`SqlValue`]. Record fields convert into it with
//! [`ToSqlValue`] and back out of it with [`FromSqlValue`].

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format used to store naive date-times as text.
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A SQL value that can be bound as a parameter or read from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Returns a short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the parameter placeholder.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(b) => {
                f.write_str("X'")?;
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

/// Errors raised when a [`SqlValue`] cannot be turned into a Rust value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value has a different shape than the target type.
    #[error("cannot convert {found} value into {expected}")]
    Mismatch {
        /// Rust type being produced.
        expected: &'static str,
        /// Variant that was found.
        found: &'static str,
    },

    /// An integer does not fit in the target type.
    #[error("integer {value} out of range for {expected}")]
    OutOfRange {
        /// Rust type being produced.
        expected: &'static str,
        /// The offending value.
        value: i64,
    },

    /// Text could not be parsed into the target type.
    #[error("cannot parse {expected} from text: {message}")]
    Parse {
        /// Rust type being produced.
        expected: &'static str,
        /// Parser message.
        message: String,
    },

    /// A positional binding addressed a field the record does not have.
    #[error("record has no field at position {0}")]
    NoSuchField(usize),
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

/// Trait for types that can be read back from SQL values.
pub trait FromSqlValue: Sized {
    /// Converts a `SqlValue` scanned from a row into `Self`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] if the value has the wrong shape or range.
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError>;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            // Backends without a boolean type store 0/1.
            SqlValue::Int(i) => Ok(i != 0),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! impl_integer {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }

            impl FromSqlValue for $ty {
                fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
                    match value {
                        SqlValue::Int(i) => <$ty>::try_from(i).map_err(|_| ValueError::OutOfRange {
                            expected: stringify!($ty),
                            value: i,
                        }),
                        SqlValue::Bool(b) => Ok(<$ty>::from(b)),
                        other => Err(mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )+
    };
}

impl_integer!(i8, i16, i32, i64, u8, u16, u32);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl FromSqlValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Float(x) => Ok(x),
            SqlValue::Int(i) => Ok(i as Self),
            other => Err(mismatch("f64", &other)),
        }
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(f64::from(self))
    }
}

impl FromSqlValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        f64::from_sql_value(value).map(|x| x as Self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(s) => Ok(s),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Blob(b) => Ok(b),
            SqlValue::Text(s) => Ok(s.into_bytes()),
            other => Err(mismatch("Vec<u8>", &other)),
        }
    }
}

impl ToSqlValue for DateTime<Utc> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.to_rfc3339())
    }
}

impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| parse_error("DateTime<Utc>", &e)),
            other => Err(mismatch("DateTime<Utc>", &other)),
        }
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.format(NAIVE_DATETIME_FORMAT).to_string())
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(s) => NaiveDateTime::parse_from_str(&s, NAIVE_DATETIME_FORMAT)
                .map_err(|e| parse_error("NaiveDateTime", &e)),
            other => Err(mismatch("NaiveDateTime", &other)),
        }
    }
}

impl ToSqlValue for serde_json::Value {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.to_string())
    }
}

impl FromSqlValue for serde_json::Value {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Text(s) => {
                serde_json::from_str(&s).map_err(|e| parse_error("serde_json::Value", &e))
            }
            SqlValue::Null => Ok(Self::Null),
            other => Err(mismatch("serde_json::Value", &other)),
        }
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue) -> Result<Self, ValueError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

fn mismatch(expected: &'static str, found: &SqlValue) -> ValueError {
    ValueError::Mismatch {
        expected,
        found: found.type_name(),
    }
}

fn parse_error(expected: &'static str, err: &dyn std::error::Error) -> ValueError {
    ValueError::Parse {
        expected,
        message: err.to_string(),
    }
}
