//! Destinations for bulk-written records.

mod clickhouse;
mod memory;
mod sqlite;

pub use self::clickhouse::ClickHouseSink;
pub use self::memory::{Chunk, MemorySink};
pub use self::sqlite::SqliteSink;

use async_trait::async_trait;
use dailies_core::{Record, TableSchema};

use crate::error::LoadResult;

/// What to do with existing destination tables before a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaMode {
    /// Drop the tables (and database, where there is one) and create them
    /// again, so a run always starts from empty tables.
    #[default]
    Recreate,
    /// Keep existing rows; only create tables that are missing.
    Append,
}

impl SchemaMode {
    pub const fn from_recreate_flag(recreate: bool) -> Self {
        if recreate {
            Self::Recreate
        } else {
            Self::Append
        }
    }
}

/// A store that accepts table DDL and bulk inserts.
///
/// Each `insert` call is one bulk write; the caller decides the batch size.
#[async_trait]
pub trait Sink: Send {
    /// Make sure `tables` exist according to `mode`.
    async fn prepare(&mut self, tables: &[&'static TableSchema], mode: SchemaMode) -> LoadResult<()>;

    /// Write `rows` to `R::TABLE` as a single bulk insert.
    async fn insert<R: Record>(&mut self, rows: &[R]) -> LoadResult<()>;
}
