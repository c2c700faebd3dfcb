use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::pipeline::LoadOptions;
use crate::sink::SchemaMode;

/// Which destination a load writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Clickhouse,
    Sqlite,
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clickhouse => f.write_str("clickhouse"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

impl FromStr for SinkKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clickhouse" => Ok(Self::Clickhouse),
            "sqlite" => Ok(Self::Sqlite),
            other => anyhow::bail!("Unknown sink: {} (expected clickhouse or sqlite)", other),
        }
    }
}

/// Configuration for dailies.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (DAILIES_* prefix)
/// 3. Config file (~/.config/dailies/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the source CSV files.
    ///
    /// - CLI: --data-dir /path/to/ml-25m
    /// - ENV: DAILIES_DATA_DIR
    /// - Default: ./datasource
    pub data_dir: PathBuf,

    /// Records per bulk insert. Must be positive.
    #[serde(deserialize_with = "from_str_or_native")]
    pub chunk_size: usize,

    /// Drop and recreate the destination tables before loading.
    ///
    /// When false, rows are appended to the existing tables.
    #[serde(deserialize_with = "from_str_or_native")]
    pub recreate_schema: bool,

    pub sink: SinkKind,

    pub clickhouse_host: String,
    /// HTTP interface port.
    #[serde(deserialize_with = "from_str_or_native")]
    pub clickhouse_port: u16,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,

    /// Database file used when `sink = "sqlite"`.
    ///
    /// Default: ~/.local/share/dailies/dailies.db
    pub sqlite_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("datasource"),
            chunk_size: 200_000,
            recreate_schema: true,
            sink: SinkKind::default(),
            clickhouse_host: String::from("localhost"),
            clickhouse_port: 8123,
            clickhouse_database: String::from("movies"),
            clickhouse_user: None,
            clickhouse_password: None,
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/dailies/config.toml
    /// Reads environment variables with DAILIES_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("dailies");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build().context("Failed to build configuration")?;

        Ok(config)
    }

    /// HTTP endpoint of the ClickHouse server.
    pub fn clickhouse_url(&self) -> String {
        format!("http://{}:{}", self.clickhouse_host, self.clickhouse_port)
    }

    pub fn schema_mode(&self) -> SchemaMode {
        SchemaMode::from_recreate_flag(self.recreate_schema)
    }

    /// Validated pipeline options.
    ///
    /// # Errors
    ///
    /// Returns an error if `chunk_size` is zero.
    pub fn load_options(&self) -> Result<LoadOptions> {
        let chunk_size = NonZeroUsize::new(self.chunk_size)
            .ok_or_else(|| anyhow::anyhow!("chunk_size must be greater than zero"))?;
        Ok(LoadOptions {
            chunk_size,
            schema_mode: self.schema_mode(),
        })
    }
}

/// A config value as written in TOML, or as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNative<T> {
    Native(T),
    Str(String),
}

/// Deserialize a number or boolean that may arrive as a string.
///
/// confyg passes every `DAILIES_*` variable through as a TOML string, so
/// `DAILIES_CHUNK_SIZE=500` reads as `"500"`.
fn from_str_or_native<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match StrOrNative::<T>::deserialize(deserializer)? {
        StrOrNative::Native(value) => Ok(value),
        StrOrNative::Str(text) => text.trim().parse().map_err(de::Error::custom),
    }
}

/// Get the default SQLite sink path.
///
/// Returns: ~/.local/share/dailies/dailies.db (or platform equivalent)
fn default_sqlite_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dailies")
        .join("dailies.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/dailies/config.toml
/// - macOS: ~/Library/Application Support/dailies/config.toml
/// - Windows: %APPDATA%\dailies\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dailies")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Dailies Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (DAILIES_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# Directory containing movies.csv, links.csv, ratings.csv, tags.csv,
# genome-tags.csv and genome-scores.csv
#
# Can also be set via:
# - CLI: dailies load --data-dir /data/ml-25m
# - Environment: DAILIES_DATA_DIR=/data/ml-25m
data_dir = "datasource"

# Records per bulk insert. Larger chunks mean fewer round trips and more
# memory held at once.
chunk_size = 200000

# Drop and recreate the tables before loading (set to false to append)
recreate_schema = true

# Destination: "clickhouse" or "sqlite"
sink = "clickhouse"

# ClickHouse HTTP interface
clickhouse_host = "localhost"
clickhouse_port = 8123
clickhouse_database = "movies"
#clickhouse_user = "default"
#clickhouse_password = ""

# Database file for the sqlite sink
#
# Default: Platform-specific data directory
#sqlite_path = "/path/to/dailies.db"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("datasource"));
        assert_eq!(config.chunk_size, 200_000);
        assert!(config.recreate_schema);
        assert_eq!(config.sink, SinkKind::Clickhouse);
        assert!(!config.sqlite_path.as_os_str().is_empty());
    }

    #[test]
    fn test_config_load() {
        // Should not fail even if config file doesn't exist
        let result = Config::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_clickhouse_url() {
        let config = Config {
            clickhouse_host: "ch.internal".into(),
            clickhouse_port: 18123,
            ..Config::default()
        };
        assert_eq!(config.clickhouse_url(), "http://ch.internal:18123");
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = Config {
            chunk_size: 0,
            ..Config::default()
        };
        assert!(config.load_options().is_err());
    }

    #[test]
    fn test_load_options_follow_recreate_flag() {
        let config = Config {
            chunk_size: 500,
            recreate_schema: false,
            ..Config::default()
        };
        let options = config.load_options().unwrap();
        assert_eq!(options.chunk_size.get(), 500);
        assert_eq!(options.schema_mode, SchemaMode::Append);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.clickhouse_database, "movies");
        assert_eq!(config.sink, SinkKind::Clickhouse);
    }

    #[test]
    fn test_string_values_are_coerced() {
        let config: Config = toml::from_str(
            "chunk_size = '500'\nrecreate_schema = 'false'\nclickhouse_port = '9123'\nsink = 'sqlite'",
        )
        .unwrap();
        assert_eq!(config.chunk_size, 500);
        assert!(!config.recreate_schema);
        assert_eq!(config.clickhouse_port, 9123);
        assert_eq!(config.sink, SinkKind::Sqlite);
    }

    #[test]
    fn test_malformed_string_value_is_rejected() {
        let result = toml::from_str::<Config>("chunk_size = 'lots'");
        assert!(result.is_err());
    }

    #[test]
    fn test_env_overrides_apply() {
        std::env::set_var("DAILIES_CHUNK_SIZE", "500");
        std::env::set_var("DAILIES_RECREATE_SCHEMA", "false");
        std::env::set_var("DAILIES_CLICKHOUSE_DATABASE", "movielens");
        let result = Config::load();
        std::env::remove_var("DAILIES_CHUNK_SIZE");
        std::env::remove_var("DAILIES_RECREATE_SCHEMA");
        std::env::remove_var("DAILIES_CLICKHOUSE_DATABASE");

        let config = result.unwrap();
        assert_eq!(config.chunk_size, 500);
        assert!(!config.recreate_schema);
        assert_eq!(config.clickhouse_database, "movielens");
        assert_eq!(config.load_options().unwrap().schema_mode, SchemaMode::Append);
    }

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!("SQLite".parse::<SinkKind>().unwrap(), SinkKind::Sqlite);
        assert!("postgres".parse::<SinkKind>().is_err());
    }
}
