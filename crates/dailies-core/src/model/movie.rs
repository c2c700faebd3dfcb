use clickhouse::Row;
use serde::Serialize;

use crate::record::Record;
use crate::schema::{TableSchema, MOVIES};
use crate::value::Value;

/// A movie with its genres and external identifiers.
///
/// `imdb_id` and `tmdb_id` start out empty and are filled in from the
/// links source once every movie is known.
#[derive(Debug, Clone, PartialEq, Serialize, Row)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub genres: Vec<String>,
    pub imdb_id: Option<i32>,
    pub tmdb_id: Option<i32>,
}

impl Movie {
    #[must_use]
    pub fn new(id: i32, title: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            id,
            title: title.into(),
            genres,
            imdb_id: None,
            tmdb_id: None,
        }
    }

    #[must_use]
    pub fn with_links(mut self, imdb_id: Option<i32>, tmdb_id: Option<i32>) -> Self {
        self.set_links(imdb_id, tmdb_id);
        self
    }

    pub fn set_links(&mut self, imdb_id: Option<i32>, tmdb_id: Option<i32>) {
        self.imdb_id = imdb_id;
        self.tmdb_id = tmdb_id;
    }
}

impl Record for Movie {
    const TABLE: &'static TableSchema = &MOVIES;

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.title.clone().into(),
            self.genres.clone().into(),
            self.imdb_id.into(),
            self.tmdb_id.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_new() {
        let movie = Movie::new(1, "Toy Story (1995)", vec!["Animation".into()]);
        assert_eq!(movie.id, 1);
        assert!(movie.imdb_id.is_none());
        assert!(movie.tmdb_id.is_none());
    }

    #[test]
    fn test_movie_with_links() {
        let movie = Movie::new(1, "Toy Story", vec![]).with_links(Some(114_709), Some(862));
        assert_eq!(movie.imdb_id, Some(114_709));
        assert_eq!(movie.tmdb_id, Some(862));
    }

    #[test]
    fn test_values_match_schema() {
        let movie = Movie::new(1, "Toy Story", vec!["Animation".into()]).with_links(None, Some(862));
        let values = movie.values();
        assert!(MOVIES.check_row(&values).is_ok());
        assert_eq!(values[3], Value::Null);
        assert_eq!(values[4], Value::Int32(862));
    }
}
