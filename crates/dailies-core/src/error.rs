use thiserror::Error;

use crate::schema::ColumnType;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{table}: expected {expected} values per row, found {found}")]
    Arity {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{table}.{column}: expected {expected}, found {found}")]
    TypeMismatch {
        table: &'static str,
        column: &'static str,
        expected: ColumnType,
        found: &'static str,
    },

    #[error("{table}.{column}: null in a non-nullable column")]
    UnexpectedNull {
        table: &'static str,
        column: &'static str,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
