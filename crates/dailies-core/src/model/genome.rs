use clickhouse::Row;
use serde::Serialize;

use crate::record::Record;
use crate::schema::{TableSchema, GENOME_SCORES};
use crate::value::Value;

/// An entry of the tag genome vocabulary. Only used as a lookup; it has no
/// table of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeTag {
    pub tag_id: i32,
    pub tag_value: String,
}

/// Relevance of a genome tag to a movie, denormalized with the tag's name.
#[derive(Debug, Clone, PartialEq, Serialize, Row)]
pub struct GenomeScore {
    pub movie_id: i32,
    pub tag_id: i32,
    pub relevance: f32,
    pub tag_name: Option<String>,
}

impl Record for GenomeScore {
    const TABLE: &'static TableSchema = &GENOME_SCORES;

    fn values(&self) -> Vec<Value> {
        vec![
            self.movie_id.into(),
            self.tag_id.into(),
            self.relevance.into(),
            self.tag_name.clone().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_flattens_to_null() {
        let score = GenomeScore {
            movie_id: 1,
            tag_id: 9999,
            relevance: 0.025,
            tag_name: None,
        };
        let values = score.values();
        assert!(GENOME_SCORES.check_row(&values).is_ok());
        assert_eq!(values[3], Value::Null);
    }
}
