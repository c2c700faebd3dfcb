use clickhouse::Row;
use serde::Serialize;

use crate::record::Record;
use crate::schema::{TableSchema, RATINGS};
use crate::value::Value;

/// One user's star rating of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Row)]
pub struct Rating {
    pub user_id: i32,
    pub movie_id: i32,
    pub rating: f32,
    /// Seconds since the Unix epoch.
    pub timestamp: u32,
}

impl Record for Rating {
    const TABLE: &'static TableSchema = &RATINGS;

    fn values(&self) -> Vec<Value> {
        vec![
            self.user_id.into(),
            self.movie_id.into(),
            self.rating.into(),
            self.timestamp.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_match_schema() {
        let rating = Rating {
            user_id: 7,
            movie_id: 1,
            rating: 4.5,
            timestamp: 1_112_486_027,
        };
        assert!(RATINGS.check_row(&rating.values()).is_ok());
    }
}
