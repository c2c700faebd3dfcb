use std::fmt;

use crate::error::{Error, Result};
use crate::value::Value;

/// Semantic column types understood by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int32,
    UInt32,
    Float32,
    String,
    StringArray,
}

impl ColumnType {
    /// ClickHouse spelling of the type (without the `Nullable` wrapper).
    #[must_use]
    pub const fn clickhouse_name(self) -> &'static str {
        match self {
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Float32 => "Float32",
            Self::String => "String",
            Self::StringArray => "Array(String)",
        }
    }

    /// SQLite storage class. Arrays are stored as JSON text.
    #[must_use]
    pub const fn sqlite_name(self) -> &'static str {
        match self {
            Self::Int32 | Self::UInt32 => "INTEGER",
            Self::Float32 => "REAL",
            Self::String | Self::StringArray => "TEXT",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clickhouse_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl Column {
    #[must_use]
    pub const fn required(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
        }
    }

    #[must_use]
    pub const fn nullable(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
        }
    }
}

/// A destination table: ordered columns plus the primary (sort) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
}

impl TableSchema {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check that a flattened row matches this table column by column.
    pub fn check_row(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::Arity {
                table: self.name,
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        for (column, value) in self.columns.iter().zip(row) {
            if value.is_null() {
                if !column.nullable {
                    return Err(Error::UnexpectedNull {
                        table: self.name,
                        column: column.name,
                    });
                }
            } else if !value.fits(column.ty) {
                return Err(Error::TypeMismatch {
                    table: self.name,
                    column: column.name,
                    expected: column.ty,
                    found: value.type_name(),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MOVIES, RATINGS};

    #[test]
    fn test_column_lookup() {
        let imdb = MOVIES.column("imdb_id").unwrap();
        assert!(imdb.nullable);
        assert_eq!(imdb.ty, ColumnType::Int32);
        assert!(MOVIES.column("rating").is_none());
    }

    #[test]
    fn test_check_row_accepts_valid_row() {
        let row = vec![
            Value::Int32(1),
            Value::from("Toy Story (1995)"),
            Value::StringArray(vec!["Animation".into()]),
            Value::Null,
            Value::Int32(862),
        ];
        assert!(MOVIES.check_row(&row).is_ok());
    }

    #[test]
    fn test_check_row_rejects_wrong_arity() {
        let err = RATINGS.check_row(&[Value::Int32(1)]).unwrap_err();
        assert!(matches!(
            err,
            Error::Arity {
                expected: 4,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_check_row_rejects_null_in_required_column() {
        let row = vec![Value::Null, Value::Int32(1), Value::Float32(3.5), Value::UInt32(0)];
        let err = RATINGS.check_row(&row).unwrap_err();
        assert!(matches!(err, Error::UnexpectedNull { column: "user_id", .. }));
    }

    #[test]
    fn test_check_row_rejects_type_mismatch() {
        let row = vec![
            Value::Int32(1),
            Value::Int32(1),
            Value::from("3.5"),
            Value::UInt32(0),
        ];
        let err = RATINGS.check_row(&row).unwrap_err();
        assert_eq!(err.to_string(), "ratings.rating: expected Float32, found String");
    }
}
