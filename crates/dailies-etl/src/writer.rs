//! Bounded-size batching in front of a [`Sink`].

use std::fmt;
use std::num::NonZeroUsize;

use dailies_core::Record;

use crate::error::LoadResult;
use crate::pipeline::Stage;
use crate::sink::Sink;

/// Default number of records per bulk write.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = match NonZeroUsize::new(200_000) {
    Some(size) => size,
    None => unreachable!(),
};

/// Upper bound on the buffer allocated up front; larger chunks grow on
/// demand.
const PREALLOCATE_LIMIT: usize = 200_000;

/// Reported after every flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkProgress {
    pub table: &'static str,
    /// 1-based index of the chunk just written.
    pub chunk: usize,
    pub chunk_rows: usize,
    /// Rows written to the table so far, this chunk included.
    pub total_rows: u64,
}

/// Receives pipeline progress notifications.
pub trait Progress {
    fn stage_started(&mut self, _stage: Stage) {}

    fn chunk_flushed(&mut self, progress: &ChunkProgress);
}

/// Progress sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn chunk_flushed(&mut self, _progress: &ChunkProgress) {}
}

impl<F: FnMut(&ChunkProgress)> Progress for F {
    fn chunk_flushed(&mut self, progress: &ChunkProgress) {
        self(progress);
    }
}

/// Outcome of loading one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub table: &'static str,
    pub rows: u64,
    pub chunks: usize,
}

impl fmt::Display for TableSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} rows in {} chunks", self.table, self.rows, self.chunks)
    }
}

/// Buffers records and writes them to the sink `chunk_size` at a time.
///
/// Every pushed record is written exactly once, in push order. All chunks
/// hold exactly `chunk_size` records except possibly the last one, which
/// [`finish`](Self::finish) flushes. A failed write is returned as is; the
/// buffered records are not retried.
pub struct ChunkedWriter<'a, S, R> {
    sink: &'a mut S,
    progress: &'a mut dyn Progress,
    chunk_size: NonZeroUsize,
    buffer: Vec<R>,
    written: u64,
    chunks: usize,
}

impl<'a, S: Sink, R: Record> ChunkedWriter<'a, S, R> {
    pub fn new(sink: &'a mut S, chunk_size: NonZeroUsize, progress: &'a mut dyn Progress) -> Self {
        Self {
            sink,
            progress,
            chunk_size,
            buffer: Vec::with_capacity(chunk_size.get().min(PREALLOCATE_LIMIT)),
            written: 0,
            chunks: 0,
        }
    }

    /// Buffer one record, flushing first-in-first-out once the buffer is full.
    pub async fn push(&mut self, record: R) -> LoadResult<()> {
        self.buffer.push(record);
        if self.buffer.len() >= self.chunk_size.get() {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush the remaining partial chunk, if any, and report the totals.
    pub async fn finish(mut self) -> LoadResult<TableSummary> {
        if !self.buffer.is_empty() {
            self.flush().await?;
        }
        Ok(TableSummary {
            table: R::TABLE.name,
            rows: self.written,
            chunks: self.chunks,
        })
    }

    /// Records currently buffered.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    async fn flush(&mut self) -> LoadResult<()> {
        let table = R::TABLE.name;
        self.sink.insert(self.buffer.as_slice()).await?;

        self.chunks += 1;
        self.written += self.buffer.len() as u64;
        let progress = ChunkProgress {
            table,
            chunk: self.chunks,
            chunk_rows: self.buffer.len(),
            total_rows: self.written,
        };
        self.buffer.clear();

        log::debug!("Inserted {} {} into DB", progress.total_rows, table);
        self.progress.chunk_flushed(&progress);
        Ok(())
    }
}

impl<S, R> fmt::Debug for ChunkedWriter<'_, S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedWriter")
            .field("chunk_size", &self.chunk_size)
            .field("pending", &self.buffer.len())
            .field("written", &self.written)
            .field("chunks", &self.chunks)
            .finish_non_exhaustive()
    }
}

/// Run every record of `records` through a [`ChunkedWriter`].
///
/// This is the one loader all tables share; what differs per table is only
/// the record iterator handed in.
pub async fn load_table<S, R, I>(
    sink: &mut S,
    records: I,
    chunk_size: NonZeroUsize,
    progress: &mut dyn Progress,
) -> LoadResult<TableSummary>
where
    S: Sink,
    R: Record,
    I: IntoIterator<Item = LoadResult<R>>,
{
    let mut writer = ChunkedWriter::new(sink, chunk_size, progress);
    for record in records {
        writer.push(record?).await?;
    }
    let summary = writer.finish().await?;
    log::info!("Loaded {}", summary);
    Ok(summary)
}
