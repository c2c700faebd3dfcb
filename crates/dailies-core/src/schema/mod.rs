//! Destination table schemas and DDL rendering.

mod ddl;
mod table;
mod tables;

pub use ddl::Dialect;
pub use table::{Column, ColumnType, TableSchema};
pub use tables::{ALL_TABLES, GENOME_SCORES, MOVIES, RATINGS, TAGS};
