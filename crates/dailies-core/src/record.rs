use clickhouse::Row;
use serde::Serialize;

use crate::schema::TableSchema;
use crate::value::Value;

/// A row type that can be bulk-written to a destination table.
///
/// The serde/`Row` side feeds ClickHouse RowBinary inserts; [`values`]
/// feeds every other sink. Both must follow the column order of [`TABLE`].
///
/// [`values`]: Record::values
/// [`TABLE`]: Record::TABLE
pub trait Record: Row + Serialize + Send + Sync + 'static {
    const TABLE: &'static TableSchema;

    /// Flatten into one [`Value`] per column.
    fn values(&self) -> Vec<Value>;
}
