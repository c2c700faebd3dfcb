use std::path::Path;

use anyhow::{Context, Result};
use dailies_etl::{
    ChunkProgress, ClickHouseSink, Config, LoadOptions, Pipeline, Progress, RunSummary, Sink,
    SinkKind, SqliteSink, Stage,
};

/// Prints one line per flushed chunk.
#[derive(Debug, Default)]
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn stage_started(&mut self, stage: Stage) {
        tracing::debug!("Stage {} started", stage);
    }

    fn chunk_flushed(&mut self, progress: &ChunkProgress) {
        println!("Inserted {} {} into DB", progress.total_rows, progress.table);
    }
}

/// Load every table into the configured sink.
pub async fn run_load(config: &Config) -> Result<()> {
    let options = config.load_options()?;
    tracing::info!("Loading into {} sink", config.sink);

    let summary = match config.sink {
        SinkKind::Clickhouse => {
            let mut sink = ClickHouseSink::new(config.clickhouse_url(), &config.clickhouse_database)
                .with_credentials(
                    config.clickhouse_user.as_deref(),
                    config.clickhouse_password.as_deref(),
                );
            load_into(&mut sink, &config.data_dir, options).await?
        }
        SinkKind::Sqlite => {
            if let Some(parent) = config.sqlite_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory {}", parent.display())
                })?;
            }
            let mut sink = SqliteSink::open(&config.sqlite_path)?;
            load_into(&mut sink, &config.data_dir, options).await?
        }
    };

    print_summary(&summary);
    Ok(())
}

async fn load_into<S: Sink>(
    sink: &mut S,
    data_dir: &Path,
    options: LoadOptions,
) -> Result<RunSummary> {
    let mut progress = ConsoleProgress;
    let mut pipeline = Pipeline::new(sink, data_dir, options).with_progress(&mut progress);
    tracing::info!("Reading sources from {}", pipeline.data_dir().display());
    pipeline
        .run()
        .await
        .with_context(|| format!("Load from {} failed", data_dir.display()))
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("Load complete");
    println!("=============");
    for table in &summary.tables {
        println!("  {table}");
    }
    println!("  genome tags in lookup: {}", summary.genome_tags);
    println!("  total rows: {}", summary.total_rows());
}
