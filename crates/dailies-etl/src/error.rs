//! Error types for the loading pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a load run.
///
/// None of these are retried: the first one stops the run and is reported
/// at the process boundary.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A source file could not be opened or read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row is malformed: wrong field count, bad UTF-8, or a non-numeric
    /// value in a numeric column.
    #[error("{source_name} line {line}: {message}")]
    Parse {
        source_name: String,
        line: u64,
        message: String,
    },

    /// A secondary source references a key missing from an already-built
    /// lookup.
    #[error("{source_name} line {line}: no {lookup} entry with id {key}")]
    JoinKey {
        source_name: String,
        line: u64,
        lookup: &'static str,
        key: i32,
    },

    /// The destination rejected a schema statement or a bulk insert.
    #[error("write to {table} failed: {source}")]
    Write {
        table: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// The four failure classes of a load, for callers that only need to
/// dispatch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    Read,
    Parse,
    JoinKey,
    Write,
}

impl fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read error",
            Self::Parse => "parse error",
            Self::JoinKey => "join key error",
            Self::Write => "write error",
        })
    }
}

impl LoadError {
    pub(crate) fn write(
        table: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Write {
            table: table.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Read { .. } => LoadErrorKind::Read,
            Self::Parse { .. } => LoadErrorKind::Parse,
            Self::JoinKey { .. } => LoadErrorKind::JoinKey,
            Self::Write { .. } => LoadErrorKind::Write,
        }
    }

    /// Source file or destination table the error is about.
    pub fn location(&self) -> String {
        match self {
            Self::Read { path, .. } => path.display().to_string(),
            Self::Parse { source_name, .. } | Self::JoinKey { source_name, .. } => {
                source_name.clone()
            }
            Self::Write { table, .. } => table.clone(),
        }
    }
}

/// Convenience alias for pipeline results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
