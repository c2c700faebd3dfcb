use std::fmt;

use async_trait::async_trait;
use clickhouse::Client;
use dailies_core::{Dialect, Record, TableSchema};

use super::{SchemaMode, Sink};
use crate::error::{LoadError, LoadResult};

/// ClickHouse over its HTTP interface.
///
/// Holds two handles: one without a default database, for creating and
/// dropping the database itself, and one bound to the load database for
/// tables and inserts. Rows are sent as RowBinary.
#[derive(Clone)]
pub struct ClickHouseSink {
    url: String,
    database: String,
    server: Client,
    client: Client,
}

impl ClickHouseSink {
    #[must_use]
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        let url = url.into();
        let database = database.into();
        let server = Client::default().with_url(&url);
        let client = server.clone().with_database(&database);
        Self {
            url,
            database,
            server,
            client,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user: Option<&str>, password: Option<&str>) -> Self {
        if let Some(user) = user {
            self.server = self.server.with_user(user);
        }
        if let Some(password) = password {
            self.server = self.server.with_password(password);
        }
        self.client = self.server.clone().with_database(&self.database);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    async fn execute(&self, client: &Client, target: &str, sql: &str) -> LoadResult<()> {
        log::debug!("ClickHouse: {}", sql);
        client
            .query(sql)
            .execute()
            .await
            .map_err(|e| LoadError::write(target, e))
    }
}

impl fmt::Debug for ClickHouseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClickHouseSink")
            .field("url", &self.url)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Sink for ClickHouseSink {
    async fn prepare(&mut self, tables: &[&'static TableSchema], mode: SchemaMode) -> LoadResult<()> {
        let db = self.database.as_str();
        if mode == SchemaMode::Recreate {
            log::info!("Dropping database {}", db);
            self.execute(&self.server, db, &format!("DROP DATABASE IF EXISTS {db}"))
                .await?;
        }
        self.execute(&self.server, db, &format!("CREATE DATABASE IF NOT EXISTS {db}"))
            .await?;

        for table in tables {
            self.execute(&self.client, table.name, &table.create_statement(Dialect::ClickHouse))
                .await?;
        }
        log::info!("Schema ready in database {} ({} tables)", db, tables.len());
        Ok(())
    }

    async fn insert<R: Record>(&mut self, rows: &[R]) -> LoadResult<()> {
        let table = R::TABLE.name;
        let mut insert = self
            .client
            .insert::<R>(table)
            .map_err(|e| LoadError::write(table, e))?;
        for row in rows {
            insert
                .write(row)
                .await
                .map_err(|e| LoadError::write(table, e))?;
        }
        insert.end().await.map_err(|e| LoadError::write(table, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_target() {
        let sink = ClickHouseSink::new("http://localhost:8123", "movies");
        assert_eq!(sink.url(), "http://localhost:8123");
        assert_eq!(sink.database(), "movies");
    }

    #[test]
    fn test_debug_hides_clients() {
        let sink = ClickHouseSink::new("http://ch:8123", "movies")
            .with_credentials(Some("loader"), Some("secret"));
        let debug = format!("{sink:?}");
        assert!(debug.contains("http://ch:8123"));
        assert!(!debug.contains("secret"));
    }
}
