use std::fmt;

use crate::schema::ColumnType;

/// A single cell of a destination row.
///
/// Records flatten into a `Vec<Value>` in column order so that sinks which
/// do not speak serde (SQLite, the in-memory sink) can bind them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int32(i32),
    UInt32(u32),
    Float32(f32),
    String(String),
    StringArray(Vec<String>),
    Null,
}

impl Value {
    /// Short name of the variant, used in type mismatch errors.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Float32(_) => "Float32",
            Self::String(_) => "String",
            Self::StringArray(_) => "Array(String)",
            Self::Null => "Null",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` when this value can be stored in a column of type `ty`.
    /// `Null` matches every type; nullability is checked by the schema.
    #[must_use]
    pub const fn fits(&self, ty: ColumnType) -> bool {
        matches!(
            (self, ty),
            (Self::Null, _)
                | (Self::Int32(_), ColumnType::Int32)
                | (Self::UInt32(_), ColumnType::UInt32)
                | (Self::Float32(_), ColumnType::Float32)
                | (Self::String(_), ColumnType::String)
                | (Self::StringArray(_), ColumnType::StringArray)
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::StringArray(v) => write!(f, "{v:?}"),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt32(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float32(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::StringArray(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
