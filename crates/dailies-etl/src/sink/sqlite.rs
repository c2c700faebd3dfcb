use std::path::Path;

use async_trait::async_trait;
use dailies_core::{Dialect, Record, TableSchema, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;

use super::{SchemaMode, Sink};
use crate::error::{LoadError, LoadResult};

/// A single-file SQLite destination with the same tables as ClickHouse.
///
/// Arrays are stored as JSON text. Each bulk insert runs in its own
/// transaction.
#[derive(Debug)]
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Open (or create) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> LoadResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| LoadError::write(path.display().to_string(), e))?;
        log::debug!("Opened SQLite sink at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_in_memory() -> LoadResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| LoadError::write(":memory:", e))?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn row_count(&self, table: &TableSchema) -> LoadResult<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table.name), [], |row| row.get(0))
            .map_err(|e| LoadError::write(table.name, e))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

fn to_sql(value: Value) -> Result<SqlValue, serde_json::Error> {
    Ok(match value {
        Value::Int32(v) => SqlValue::Integer(i64::from(v)),
        Value::UInt32(v) => SqlValue::Integer(i64::from(v)),
        Value::Float32(v) => SqlValue::Real(f64::from(v)),
        Value::String(v) => SqlValue::Text(v),
        Value::StringArray(v) => SqlValue::Text(serde_json::to_string(&v)?),
        Value::Null => SqlValue::Null,
    })
}

#[async_trait]
impl Sink for SqliteSink {
    async fn prepare(&mut self, tables: &[&'static TableSchema], mode: SchemaMode) -> LoadResult<()> {
        for table in tables {
            if mode == SchemaMode::Recreate {
                log::info!("Dropping table {}", table.name);
                self.conn
                    .execute_batch(&table.drop_statement())
                    .map_err(|e| LoadError::write(table.name, e))?;
            }
            self.conn
                .execute_batch(&table.create_statement(Dialect::Sqlite))
                .map_err(|e| LoadError::write(table.name, e))?;
        }
        Ok(())
    }

    async fn insert<R: Record>(&mut self, rows: &[R]) -> LoadResult<()> {
        let table = R::TABLE;
        let fail = |e: rusqlite::Error| LoadError::write(table.name, e);

        let tx = self.conn.transaction().map_err(fail)?;
        {
            let mut stmt = tx.prepare_cached(&table.insert_statement()).map_err(fail)?;
            for record in rows {
                let values = record.values();
                table
                    .check_row(&values)
                    .map_err(|e| LoadError::write(table.name, e))?;
                let params = values
                    .into_iter()
                    .map(to_sql)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| LoadError::write(table.name, e))?;
                stmt.execute(rusqlite::params_from_iter(params)).map_err(fail)?;
            }
        }
        tx.commit().map_err(fail)?;

        log::debug!("Wrote {} rows to {}", rows.len(), table.name);
        Ok(())
    }
}
