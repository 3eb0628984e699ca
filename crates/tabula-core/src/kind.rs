//! Language-level column shapes.
//!
//! A dialect never sees a Rust type directly. Each supported field type
//! declares a [`ColumnKind`] through [`SqlType`], and the dialect maps the
//! kind to its own column type string.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};

/// The shape of a record field, independent of any backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// `bool`.
    Bool,
    /// Integers up to 32 bits.
    Integer,
    /// 64-bit integers.
    BigInt,
    /// Floating point numbers.
    Float,
    /// Strings.
    Text,
    /// Byte arrays.
    Blob,
    /// Date-times.
    DateTime,
    /// Structured JSON documents.
    Json,
}

impl ColumnKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Bool,
        Self::Integer,
        Self::BigInt,
        Self::Float,
        Self::Text,
        Self::Blob,
        Self::DateTime,
        Self::Json,
    ];
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::BigInt => "bigint",
            Self::Float => "float",
            Self::Text => "text",
            Self::Blob => "blob",
            Self::DateTime => "datetime",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Associates a Rust field type with its [`ColumnKind`].
///
/// `#[derive(Record)]` reads `<T as SqlType>::KIND` for every mapped field,
/// so a field whose type lacks this impl is rejected at compile time.
pub trait SqlType {
    /// The column kind of this type.
    const KIND: ColumnKind;
}

macro_rules! impl_sql_type {
    ($kind:ident => $($ty:ty),+) => {
        $(
            impl SqlType for $ty {
                const KIND: ColumnKind = ColumnKind::$kind;
            }
        )+
    };
}

impl_sql_type!(Bool => bool);
impl_sql_type!(Integer => i8, i16, i32, u8, u16, u32);
impl_sql_type!(BigInt => i64);
impl_sql_type!(Float => f32, f64);
impl_sql_type!(Text => String);
impl_sql_type!(Blob => Vec<u8>);
impl_sql_type!(DateTime => DateTime<Utc>, NaiveDateTime);
impl_sql_type!(Json => serde_json::Value);

impl<T: SqlType> SqlType for Option<T> {
    const KIND: ColumnKind = T::KIND;
}
