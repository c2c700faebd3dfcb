use clickhouse::Row;
use serde::Serialize;

use crate::record::Record;
use crate::schema::{TableSchema, TAGS};
use crate::value::Value;

/// A free-text tag a user applied to a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Row)]
pub struct Tag {
    pub user_id: i32,
    pub movie_id: i32,
    pub tag: String,
    pub timestamp: u32,
}

impl Record for Tag {
    const TABLE: &'static TableSchema = &TAGS;

    fn values(&self) -> Vec<Value> {
        vec![
            self.user_id.into(),
            self.movie_id.into(),
            self.tag.clone().into(),
            self.timestamp.into(),
        ]
    }
}
