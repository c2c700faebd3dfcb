use std::fmt;
use std::str::FromStr;

use super::table::TableSchema;
use crate::error::Error;

/// SQL dialect a schema is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    ClickHouse,
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClickHouse => f.write_str("clickhouse"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clickhouse" => Ok(Self::ClickHouse),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(Error::InvalidData(format!("unknown SQL dialect: {other}"))),
        }
    }
}

impl TableSchema {
    /// `CREATE TABLE IF NOT EXISTS` for this table.
    ///
    /// ClickHouse gets a `MergeTree` table keyed by the primary key. SQLite
    /// gets a plain table plus a non-unique index over the same columns:
    /// a MergeTree primary key orders rows but never rejects duplicates, and
    /// the tags source legitimately repeats `(movie_id, user_id)`.
    #[must_use]
    pub fn create_statement(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| match dialect {
                Dialect::ClickHouse if c.nullable => {
                    format!("    {} Nullable({})", c.name, c.ty.clickhouse_name())
                }
                Dialect::ClickHouse => format!("    {} {}", c.name, c.ty.clickhouse_name()),
                Dialect::Sqlite if c.nullable => format!("    {} {}", c.name, c.ty.sqlite_name()),
                Dialect::Sqlite => format!("    {} {} NOT NULL", c.name, c.ty.sqlite_name()),
            })
            .collect::<Vec<_>>()
            .join(",\n");
        let key = self.primary_key.join(", ");

        match dialect {
            Dialect::ClickHouse => {
                let key = if self.primary_key.len() == 1 {
                    key
                } else {
                    format!("({key})")
                };
                format!(
                    "CREATE TABLE IF NOT EXISTS {} (\n{}\n) ENGINE = MergeTree()\nPRIMARY KEY {}",
                    self.name, columns, key
                )
            }
            Dialect::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {name} (\n{columns}\n);\n\
                 CREATE INDEX IF NOT EXISTS idx_{name}_key ON {name} ({key});",
                name = self.name,
            ),
        }
    }

    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// `INSERT` with one positional placeholder per column (SQLite only;
    /// ClickHouse inserts go through RowBinary).
    #[must_use]
    pub fn insert_statement(&self) -> String {
        let names = self.column_names().collect::<Vec<_>>().join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {} ({}) VALUES ({})", self.name, names, placeholders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GENOME_SCORES, MOVIES, RATINGS};

    #[test]
    fn test_clickhouse_movies_ddl() {
        let ddl = MOVIES.create_statement(Dialect::ClickHouse);
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS movies (\n    id Int32,\n    title String,\n    \
             genres Array(String),\n    imdb_id Nullable(Int32),\n    tmdb_id Nullable(Int32)\n\
             ) ENGINE = MergeTree()\nPRIMARY KEY id"
        );
    }

    #[test]
    fn test_clickhouse_composite_key() {
        let ddl = GENOME_SCORES.create_statement(Dialect::ClickHouse);
        assert!(ddl.ends_with("PRIMARY KEY (movie_id, tag_id)"));
        assert!(ddl.contains("tag_name Nullable(String)"));
    }

    #[test]
    fn test_sqlite_ddl_uses_index_not_unique_key() {
        let ddl = RATINGS.create_statement(Dialect::Sqlite);
        assert!(ddl.contains("rating REAL NOT NULL"));
        assert!(ddl.contains("CREATE INDEX IF NOT EXISTS idx_ratings_key ON ratings (movie_id, user_id);"));
        assert!(!ddl.contains("PRIMARY KEY"));
    }

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            RATINGS.insert_statement(),
            "INSERT INTO ratings (user_id, movie_id, rating, timestamp) VALUES (?1, ?2, ?3, ?4)"
        );
    }

    #[test]
    fn test_dialect_parse() {
        assert_eq!("ClickHouse".parse::<Dialect>().unwrap(), Dialect::ClickHouse);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert!("postgres".parse::<Dialect>().is_err());
    }
}
