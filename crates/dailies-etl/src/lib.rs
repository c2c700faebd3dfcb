//! Loading pipeline for dailies.
//!
//! Reads the MovieLens-style CSV sources, joins movies with their links and
//! genome scores with tag names, and bulk-writes every table to a [`Sink`]
//! in bounded chunks.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod lookup;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod transform;
pub mod writer;

pub use config::{Config, SinkKind};
pub use error::{LoadError, LoadErrorKind, LoadResult};
pub use lookup::Lookup;
pub use pipeline::{LoadOptions, Pipeline, RunSummary, Stage};
pub use sink::{ClickHouseSink, MemorySink, SchemaMode, Sink, SqliteSink};
pub use source::{RawRow, SourceFile, SourceReader};
pub use writer::{ChunkProgress, ChunkedWriter, NoProgress, Progress, TableSummary};
