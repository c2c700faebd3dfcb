use dailies_core::schema::ALL_TABLES;
use dailies_core::Dialect;

/// Print the DDL for every table, ready to pipe into a client.
pub fn show_schema(dialect: Dialect) {
    print!("{}", render_schema(dialect));
}

fn render_schema(dialect: Dialect) -> String {
    let mut out = String::new();
    for table in ALL_TABLES {
        out.push_str(&table.create_statement(dialect));
        if dialect == Dialect::ClickHouse {
            out.push(';');
        }
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clickhouse_schema_covers_every_table() {
        let ddl = render_schema(Dialect::ClickHouse);
        for name in ["movies", "ratings", "tags", "genome_scores"] {
            assert!(ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {name} (")));
        }
        assert_eq!(ddl.matches("ENGINE = MergeTree()").count(), 4);
        assert_eq!(ddl.matches(';').count(), 4);
    }

    #[test]
    fn test_sqlite_schema_has_indexes() {
        let ddl = render_schema(Dialect::Sqlite);
        assert_eq!(ddl.matches("CREATE INDEX IF NOT EXISTS").count(), 4);
        assert!(!ddl.contains("MergeTree"));
    }
}
