use super::table::{Column, ColumnType, TableSchema};

pub const MOVIES: TableSchema = TableSchema {
    name: "movies",
    columns: &[
        Column::required("id", ColumnType::Int32),
        Column::required("title", ColumnType::String),
        Column::required("genres", ColumnType::StringArray),
        Column::nullable("imdb_id", ColumnType::Int32),
        Column::nullable("tmdb_id", ColumnType::Int32),
    ],
    primary_key: &["id"],
};

pub const GENOME_SCORES: TableSchema = TableSchema {
    name: "genome_scores",
    columns: &[
        Column::required("movie_id", ColumnType::Int32),
        Column::required("tag_id", ColumnType::Int32),
        Column::required("relevance", ColumnType::Float32),
        Column::nullable("tag_name", ColumnType::String),
    ],
    primary_key: &["movie_id", "tag_id"],
};

pub const RATINGS: TableSchema = TableSchema {
    name: "ratings",
    columns: &[
        Column::required("user_id", ColumnType::Int32),
        Column::required("movie_id", ColumnType::Int32),
        Column::required("rating", ColumnType::Float32),
        Column::required("timestamp", ColumnType::UInt32),
    ],
    primary_key: &["movie_id", "user_id"],
};

pub const TAGS: TableSchema = TableSchema {
    name: "tags",
    columns: &[
        Column::required("user_id", ColumnType::Int32),
        Column::required("movie_id", ColumnType::Int32),
        Column::required("tag", ColumnType::String),
        Column::required("timestamp", ColumnType::UInt32),
    ],
    primary_key: &["movie_id", "user_id"],
};

/// Every destination table, in creation order.
pub const ALL_TABLES: &[&TableSchema] = &[&MOVIES, &GENOME_SCORES, &RATINGS, &TAGS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_keys_name_existing_columns() {
        for table in ALL_TABLES {
            for key in table.primary_key {
                assert!(
                    table.column(key).is_some(),
                    "{}: key column {} missing",
                    table.name,
                    key
                );
            }
        }
    }

    #[test]
    fn test_only_join_columns_are_nullable() {
        let nullable: Vec<_> = ALL_TABLES
            .iter()
            .flat_map(|t| t.columns.iter().filter(|c| c.nullable).map(|c| (t.name, c.name)))
            .collect();
        assert_eq!(
            nullable,
            vec![
                ("movies", "imdb_id"),
                ("movies", "tmdb_id"),
                ("genome_scores", "tag_name"),
            ]
        );
    }
}
