//! The load run: five stages, strictly in order, against one sink.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use dailies_core::schema::ALL_TABLES;
use dailies_core::Record;

use crate::error::LoadResult;
use crate::lookup::Lookup;
use crate::sink::{SchemaMode, Sink};
use crate::source::{
    GENOME_SCORES_CSV, GENOME_TAGS_CSV, LINKS_CSV, MOVIES_CSV, RATINGS_CSV, TAGS_CSV,
};
use crate::transform;
use crate::writer::{load_table, NoProgress, Progress, TableSummary, DEFAULT_CHUNK_SIZE};

/// One step of a load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `movies.csv` joined with `links.csv` into `movies`.
    Movies,
    Ratings,
    Tags,
    /// `genome-tags.csv` into an in-memory lookup; writes nothing.
    GenomeTags,
    /// `genome-scores.csv` joined with the genome tag lookup.
    GenomeScores,
}

impl Stage {
    /// Execution order.
    pub const ALL: [Self; 5] = [
        Self::Movies,
        Self::Ratings,
        Self::Tags,
        Self::GenomeTags,
        Self::GenomeScores,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Ratings => "ratings",
            Self::Tags => "tags",
            Self::GenomeTags => "genome tags",
            Self::GenomeScores => "genome scores",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Knobs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub chunk_size: NonZeroUsize,
    pub schema_mode: SchemaMode,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            schema_mode: SchemaMode::Recreate,
        }
    }
}

/// What a completed run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One entry per written table, in load order.
    pub tables: Vec<TableSummary>,
    /// Entries in the genome tag lookup.
    pub genome_tags: usize,
}

impl RunSummary {
    pub fn table(&self, name: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.table == name)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// A configured load run.
///
/// The sink is borrowed for the whole run and shared by every stage; it
/// is the only connection the run uses. The first error of any stage ends
/// the run and leaves already-written chunks in place.
pub struct Pipeline<'a, S> {
    sink: &'a mut S,
    data_dir: PathBuf,
    options: LoadOptions,
    progress: Option<&'a mut dyn Progress>,
}

impl<'a, S: Sink> Pipeline<'a, S> {
    pub fn new(sink: &'a mut S, data_dir: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self {
            sink,
            data_dir: data_dir.into(),
            options,
            progress: None,
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: &'a mut dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Prepare the schema, then run every stage in [`Stage::ALL`] order.
    pub async fn run(&mut self) -> LoadResult<RunSummary> {
        log::info!(
            "Loading from {} (chunk size {}, {:?})",
            self.data_dir.display(),
            self.options.chunk_size,
            self.options.schema_mode
        );
        self.sink
            .prepare(ALL_TABLES, self.options.schema_mode)
            .await?;

        let mut summary = RunSummary::default();
        let mut genome_tags = Lookup::new("genome tags");
        for stage in Stage::ALL {
            log::info!("Starting stage: {}", stage);
            if let Some(progress) = self.progress.as_deref_mut() {
                progress.stage_started(stage);
            }
            match stage {
                Stage::Movies => summary.tables.push(self.load_movies().await?),
                Stage::Ratings => summary.tables.push(self.load_ratings().await?),
                Stage::Tags => summary.tables.push(self.load_tags().await?),
                Stage::GenomeTags => {
                    genome_tags = self.build_genome_tags()?;
                    summary.genome_tags = genome_tags.len();
                }
                Stage::GenomeScores => {
                    summary.tables.push(self.load_genome_scores(&genome_tags).await?);
                }
            }
        }

        log::info!("Load complete: {} rows", summary.total_rows());
        Ok(summary)
    }

    /// Movies are fully materialized: every movie must be known before the
    /// links pass can fill in its external ids.
    async fn load_movies(&mut self) -> LoadResult<TableSummary> {
        let mut movies = Lookup::build("movies", MOVIES_CSV.open(&self.data_dir)?, |row| {
            let movie = transform::movie(row)?;
            Ok((movie.id, movie))
        })?;
        let links = transform::join_links(&mut movies, LINKS_CSV.open(&self.data_dir)?)?;
        log::info!("Inserting {} movies into DB ({} links)", movies.len(), links);

        self.write(movies.into_values().map(Ok)).await
    }

    async fn load_ratings(&mut self) -> LoadResult<TableSummary> {
        let rows = RATINGS_CSV.open(&self.data_dir)?;
        self.write(rows.map(|row| transform::rating(&row?))).await
    }

    async fn load_tags(&mut self) -> LoadResult<TableSummary> {
        let rows = TAGS_CSV.open(&self.data_dir)?;
        self.write(rows.map(|row| transform::tag(&row?))).await
    }

    /// Hand one table's records to the shared chunked loader.
    async fn write<R, I>(&mut self, records: I) -> LoadResult<TableSummary>
    where
        R: Record,
        I: IntoIterator<Item = LoadResult<R>>,
    {
        let mut silent = NoProgress;
        let progress: &mut dyn Progress = match self.progress.as_deref_mut() {
            Some(progress) => progress,
            None => &mut silent,
        };
        load_table(&mut *self.sink, records, self.options.chunk_size, progress).await
    }

    fn build_genome_tags(&self) -> LoadResult<Lookup<String>> {
        Lookup::build(
            "genome tags",
            GENOME_TAGS_CSV.open(&self.data_dir)?,
            |row| {
                let tag = transform::genome_tag(row)?;
                Ok((tag.tag_id, tag.tag_value))
            },
        )
    }

    async fn load_genome_scores(&mut self, tags: &Lookup<String>) -> LoadResult<TableSummary> {
        let rows = GENOME_SCORES_CSV.open(&self.data_dir)?;
        self.write(rows.map(|row| transform::genome_score(&row?, tags)))
            .await
    }
}

impl<S> fmt::Debug for Pipeline<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("data_dir", &self.data_dir)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let names: Vec<_> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["movies", "ratings", "tags", "genome tags", "genome scores"]
        );
    }

    #[test]
    fn test_default_options() {
        let options = LoadOptions::default();
        assert_eq!(options.chunk_size.get(), 200_000);
        assert_eq!(options.schema_mode, SchemaMode::Recreate);
    }

    #[test]
    fn test_run_summary_lookup() {
        let summary = RunSummary {
            tables: vec![
                TableSummary {
                    table: "movies",
                    rows: 3,
                    chunks: 1,
                },
                TableSummary {
                    table: "ratings",
                    rows: 10,
                    chunks: 2,
                },
            ],
            genome_tags: 0,
        };
        assert_eq!(summary.table("ratings").map(|t| t.rows), Some(10));
        assert!(summary.table("tags").is_none());
        assert_eq!(summary.total_rows(), 13);
    }
}
