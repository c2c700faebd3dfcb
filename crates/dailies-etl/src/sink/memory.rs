use async_trait::async_trait;
use dailies_core::{Record, TableSchema, Value};

use super::{SchemaMode, Sink};
use crate::error::{LoadError, LoadResult};

/// One bulk write received by a [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub table: &'static str,
    pub rows: Vec<Vec<Value>>,
}

/// A sink that keeps every chunk in memory, in arrival order.
///
/// Rows are validated against the table schema exactly like the SQLite
/// sink validates them, so tests exercise the same contract.
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Vec<&'static str>,
    chunks: Vec<Chunk>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn chunks_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Chunk> + 'a {
        self.chunks.iter().filter(move |c| c.table == table)
    }

    /// All rows written to `table`, chunk boundaries removed.
    pub fn rows(&self, table: &str) -> Vec<&[Value]> {
        self.chunks
            .iter()
            .filter(|c| c.table == table)
            .flat_map(|c| c.rows.iter().map(Vec::as_slice))
            .collect()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.chunks_for(table).map(|c| c.rows.len()).sum()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn prepare(&mut self, tables: &[&'static TableSchema], mode: SchemaMode) -> LoadResult<()> {
        if mode == SchemaMode::Recreate {
            self.chunks.retain(|c| !tables.iter().any(|t| t.name == c.table));
            self.tables.clear();
        }
        for table in tables {
            if !self.tables.contains(&table.name) {
                self.tables.push(table.name);
            }
        }
        Ok(())
    }

    async fn insert<R: Record>(&mut self, rows: &[R]) -> LoadResult<()> {
        let table = R::TABLE;
        if !self.tables.contains(&table.name) {
            return Err(LoadError::write(
                table.name,
                format!("table {} does not exist", table.name),
            ));
        }

        let rows = rows
            .iter()
            .map(|record| {
                let values = record.values();
                table
                    .check_row(&values)
                    .map(|()| values)
                    .map_err(|e| LoadError::write(table.name, e))
            })
            .collect::<LoadResult<Vec<_>>>()?;

        self.chunks.push(Chunk {
            table: table.name,
            rows,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadErrorKind;
    use dailies_core::model::Rating;
    use dailies_core::schema::{ALL_TABLES, RATINGS};

    fn rating(user_id: i32) -> Rating {
        Rating {
            user_id,
            movie_id: 1,
            rating: 4.0,
            timestamp: 0,
        }
    }

    #[tokio::test]
    async fn test_insert_requires_prepare() {
        let mut sink = MemorySink::new();
        let err = sink.insert(&[rating(1)]).await.unwrap_err();
        assert_eq!(err.kind(), LoadErrorKind::Write);
    }

    #[tokio::test]
    async fn test_chunks_kept_in_order() {
        let mut sink = MemorySink::new();
        sink.prepare(ALL_TABLES, SchemaMode::Recreate).await.unwrap();
        sink.insert(&[rating(1), rating(2)]).await.unwrap();
        sink.insert(&[rating(3)]).await.unwrap();

        assert_eq!(sink.chunks().len(), 2);
        assert_eq!(sink.row_count(RATINGS.name), 3);
        let users: Vec<_> = sink.rows("ratings").iter().map(|r| r[0].clone()).collect();
        assert_eq!(users, vec![Value::Int32(1), Value::Int32(2), Value::Int32(3)]);
    }

    #[tokio::test]
    async fn test_recreate_discards_rows_append_keeps_them() {
        let mut sink = MemorySink::new();
        sink.prepare(ALL_TABLES, SchemaMode::Recreate).await.unwrap();
        sink.insert(&[rating(1)]).await.unwrap();

        sink.prepare(ALL_TABLES, SchemaMode::Append).await.unwrap();
        assert_eq!(sink.row_count("ratings"), 1);

        sink.prepare(ALL_TABLES, SchemaMode::Recreate).await.unwrap();
        assert_eq!(sink.row_count("ratings"), 0);
    }
}
