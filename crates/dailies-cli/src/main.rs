use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use dailies_core::Dialect;
use dailies_etl::SinkKind;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "dailies", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Load the MovieLens CSV files into the database
    ///
    /// Runs five stages in order against a single connection:
    ///
    /// - movies: movies.csv joined with links.csv (IMDb and TMDb ids)
    /// - ratings: ratings.csv
    /// - tags: tags.csv
    /// - genome tags: genome-tags.csv, kept in memory as a lookup
    /// - genome scores: genome-scores.csv, each score named by its tag
    ///
    /// Rows are written in bulk chunks of `--chunk-size` records. A line is
    /// printed after every chunk with the number of rows written so far.
    ///
    /// By default the database and its tables are dropped and recreated
    /// first. Use --append to keep existing rows.
    ///
    /// The first error ends the run. Chunks already written stay written.
    Load(LoadArgs),
    /// Print the CREATE TABLE statements for every table
    Schema {
        /// SQL dialect: clickhouse or sqlite
        #[arg(long, default_value = "clickhouse")]
        dialect: Dialect,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for settings from the config file and environment.
#[derive(Debug, clap::Args)]
struct LoadArgs {
    /// Directory holding the source CSV files
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Records per bulk insert
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Append to the existing tables instead of recreating them
    #[arg(long)]
    append: bool,

    /// Destination: clickhouse or sqlite
    #[arg(long)]
    sink: Option<SinkKind>,

    /// ClickHouse host
    #[arg(long)]
    host: Option<String>,

    /// ClickHouse HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// ClickHouse database
    #[arg(long)]
    database: Option<String>,

    /// SQLite database file
    #[arg(long)]
    sqlite_path: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print one config value, or the config file if no key is given
    Get {
        key: Option<String>,
    },
    /// Create the config file with defaults
    Init,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Load(args) => {
            let mut config = dailies_etl::Config::load()?;
            args.apply(&mut config);
            commands::run_load(&config).await?;
        }
        Commands::Schema { dialect } => commands::show_schema(dialect),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config()?,
            ConfigAction::Get { key } => commands::config::get_config(key.as_deref())?,
            ConfigAction::Init => commands::config::init_config()?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
        },
    }

    Ok(())
}

impl LoadArgs {
    fn apply(self, config: &mut dailies_etl::Config) {
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.append {
            config.recreate_schema = false;
        }
        if let Some(sink) = self.sink {
            config.sink = sink;
        }
        if let Some(host) = self.host {
            config.clickhouse_host = host;
        }
        if let Some(port) = self.port {
            config.clickhouse_port = port;
        }
        if let Some(database) = self.database {
            config.clickhouse_database = database;
        }
        if let Some(sqlite_path) = self.sqlite_path {
            config.sqlite_path = sqlite_path;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_load_args_override_config() {
        let cli = Cli::try_parse_from([
            "dailies",
            "load",
            "--data-dir",
            "/data/ml-25m",
            "--chunk-size",
            "5000",
            "--append",
            "--sink",
            "sqlite",
        ])
        .unwrap();
        let Commands::Load(args) = cli.command else {
            panic!("expected load command");
        };

        let mut config = dailies_etl::Config::default();
        args.apply(&mut config);
        assert_eq!(config.data_dir, PathBuf::from("/data/ml-25m"));
        assert_eq!(config.chunk_size, 5000);
        assert!(!config.recreate_schema);
        assert_eq!(config.sink, SinkKind::Sqlite);
        assert_eq!(config.clickhouse_port, 8123);
    }

    #[test]
    fn test_schema_dialect_parses() {
        let cli = Cli::try_parse_from(["dailies", "schema", "--dialect", "sqlite"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema {
                dialect: Dialect::Sqlite
            }
        ));
        assert!(Cli::try_parse_from(["dailies", "schema", "--dialect", "mysql"]).is_err());
    }
}
