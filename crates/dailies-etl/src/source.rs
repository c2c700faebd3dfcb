//! CSV source files and the reader that streams their rows.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Terminator};

use crate::error::{LoadError, LoadResult};

/// A known input file: its name inside the data directory and its columns.
///
/// Column names are only used for field counts and error messages; the
/// header row itself is skipped, never matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    pub file_name: &'static str,
    pub columns: &'static [&'static str],
}

pub const MOVIES_CSV: SourceFile = SourceFile {
    file_name: "movies.csv",
    columns: &["movie_id", "title", "genres"],
};

pub const LINKS_CSV: SourceFile = SourceFile {
    file_name: "links.csv",
    columns: &["movie_id", "imdb_id", "tmdb_id"],
};

pub const GENOME_TAGS_CSV: SourceFile = SourceFile {
    file_name: "genome-tags.csv",
    columns: &["tag_id", "tag_value"],
};

pub const GENOME_SCORES_CSV: SourceFile = SourceFile {
    file_name: "genome-scores.csv",
    columns: &["movie_id", "tag_id", "relevance"],
};

pub const RATINGS_CSV: SourceFile = SourceFile {
    file_name: "ratings.csv",
    columns: &["user_id", "movie_id", "rating", "timestamp"],
};

pub const TAGS_CSV: SourceFile = SourceFile {
    file_name: "tags.csv",
    columns: &["user_id", "movie_id", "tag", "timestamp"],
};

impl SourceFile {
    #[must_use]
    pub fn path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(self.file_name)
    }

    /// Open this source inside `data_dir`.
    pub fn open(&self, data_dir: &Path) -> LoadResult<SourceReader<File>> {
        SourceReader::open(self.path_in(data_dir), self.columns.len())
    }

    /// Read this source from an arbitrary reader (used by tests).
    pub fn from_reader<R: io::Read>(&self, reader: R) -> SourceReader<R> {
        SourceReader::from_reader(self.file_name, reader, self.columns.len())
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name)
    }
}

/// One data row of a source file.
#[derive(Debug, Clone)]
pub struct RawRow {
    source: Arc<str>,
    line: u64,
    fields: StringRecord,
}

impl RawRow {
    #[must_use]
    pub fn new(source: &str, line: u64, fields: &[&str]) -> Self {
        Self {
            source: Arc::from(source),
            line,
            fields: StringRecord::from(fields.to_vec()),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source
    }

    /// 1-based line number of the row in its file.
    pub const fn line(&self) -> u64 {
        self.line
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The raw text of field `index`; empty when out of range.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).unwrap_or_default()
    }

    pub fn text(&self, index: usize) -> String {
        self.field(index).to_owned()
    }

    /// Parse a required numeric field.
    pub fn parse<T: FromStr>(&self, index: usize, column: &str) -> LoadResult<T> {
        let raw = self.field(index).trim();
        raw.parse().map_err(|_| {
            self.parse_error(format!(
                "column {column}: expected {}, found {raw:?}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Parse a nullable numeric field; the empty string is absent.
    pub fn parse_optional<T: FromStr>(&self, index: usize, column: &str) -> LoadResult<Option<T>> {
        if self.field(index).trim().is_empty() {
            Ok(None)
        } else {
            self.parse(index, column).map(Some)
        }
    }

    pub fn parse_error(&self, message: impl Into<String>) -> LoadError {
        LoadError::Parse {
            source_name: self.source.to_string(),
            line: self.line,
            message: message.into(),
        }
    }
}

/// Lazy reader over the data rows of one CSV source.
///
/// The header row is always discarded. Every yielded row has exactly the
/// expected number of fields; any other width is a parse error, and so is a
/// blank line. Line numbers are physical: a quoted field spanning several
/// lines moves the following rows down accordingly. The reader is
/// single-pass: open a new one to read the file again.
pub struct SourceReader<R> {
    name: Arc<str>,
    path: PathBuf,
    expected_fields: usize,
    records: StringRecordsIntoIter<Terminated<R>>,
    header_read: bool,
    /// Line the next record starts on unless blank lines come first.
    next_line: u64,
    finished: bool,
}

impl SourceReader<File> {
    pub fn open(path: impl AsRef<Path>, expected_fields: usize) -> LoadResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| LoadError::Read {
            path: path.to_path_buf(),
            source: csv::Error::from(err),
        })?;
        log::debug!("Opened {}", path.display());

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut reader = Self::from_reader(&name, file, expected_fields);
        reader.path = path.to_path_buf();
        Ok(reader)
    }
}

impl<R: io::Read> SourceReader<R> {
    pub fn from_reader(name: &str, reader: R, expected_fields: usize) -> Self {
        Self {
            name: Arc::from(name),
            path: PathBuf::from(name),
            expected_fields,
            records: Self::builder()
                .from_reader(Terminated::new(reader))
                .into_records(),
            header_read: false,
            next_line: 1,
            finished: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn builder() -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        // The header and row widths are handled here so errors carry
        // physical line numbers. Records end at LF only; a trailing CR is
        // stripped per record.
        builder
            .has_headers(false)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'));
        builder
    }

    /// Line the reader has consumed up to, after the last record read.
    fn consumed_line(&self) -> u64 {
        self.records.reader().position().line()
    }

    fn csv_error(&self, err: csv::Error, line: u64) -> LoadError {
        if err.is_io_error() {
            LoadError::Read {
                path: self.path.clone(),
                source: err,
            }
        } else {
            LoadError::Parse {
                source_name: self.name.to_string(),
                line,
                message: err.to_string(),
            }
        }
    }

    fn blank_line_error(&self, line: u64) -> LoadError {
        LoadError::Parse {
            source_name: self.name.to_string(),
            line,
            message: format!("expected {} fields, found 0", self.expected_fields),
        }
    }

    fn convert(&mut self, result: Result<StringRecord, csv::Error>) -> LoadResult<RawRow> {
        let line = self.next_line;
        self.next_line = self.consumed_line();
        let fields = result.map_err(|err| self.csv_error(err, line))?;

        // Every record spans its embedded newlines plus its terminator, so
        // anything consumed beyond that was blank lines skipped by csv.
        let start = self
            .next_line
            .saturating_sub(embedded_newlines(&fields) + 1);
        let fields = strip_carriage_return(fields);
        if start > line || is_blank(&fields) {
            return Err(self.blank_line_error(line));
        }

        let row = RawRow {
            source: Arc::clone(&self.name),
            line,
            fields,
        };

        if row.len() != self.expected_fields {
            return Err(row.parse_error(format!(
                "expected {} fields, found {}",
                self.expected_fields,
                row.len()
            )));
        }

        Ok(row)
    }
}

impl<R: io::Read> Iterator for SourceReader<R> {
    type Item = LoadResult<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some(result) = self.records.next() else {
                self.finished = true;
                // Blank lines after the last record.
                let trailing = self.header_read && self.consumed_line() > self.next_line;
                return trailing.then(|| Err(self.blank_line_error(self.next_line)));
            };

            if self.header_read {
                return Some(self.convert(result));
            }
            self.header_read = true;
            self.next_line = self.consumed_line();
            if let Err(err) = result {
                return Some(Err(self.csv_error(err, 1)));
            }
        }
    }
}

impl<R> fmt::Debug for SourceReader<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceReader")
            .field("name", &self.name)
            .field("expected_fields", &self.expected_fields)
            .field("next_line", &self.next_line)
            .finish_non_exhaustive()
    }
}

fn embedded_newlines(fields: &StringRecord) -> u64 {
    fields
        .iter()
        .map(|f| f.bytes().filter(|&b| b == b'\n').count() as u64)
        .sum()
}

fn is_blank(fields: &StringRecord) -> bool {
    fields.len() == 1 && fields.get(0).is_some_and(str::is_empty)
}

fn strip_carriage_return(fields: StringRecord) -> StringRecord {
    let last = fields.len().saturating_sub(1);
    if !fields.get(last).is_some_and(|f| f.ends_with('\r')) {
        return fields;
    }
    fields
        .iter()
        .enumerate()
        .map(|(i, f)| if i == last { f.trim_end_matches('\r') } else { f })
        .collect()
}

/// Input adapter that ends the stream with a newline if it lacks one, so
/// every record is followed by a terminator.
struct Terminated<R> {
    inner: R,
    last: Option<u8>,
    done: bool,
}

impl<R> Terminated<R> {
    const fn new(inner: R) -> Self {
        Self {
            inner,
            last: None,
            done: false,
        }
    }
}

impl<R: io::Read> io::Read for Terminated<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        let n = self.inner.read(buf)?;
        if let Some(&byte) = buf[..n].last() {
            self.last = Some(byte);
            return Ok(n);
        }
        self.done = true;
        match self.last {
            Some(byte) if byte != b'\n' => {
                buf[0] = b'\n';
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
