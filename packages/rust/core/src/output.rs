//! CSV output table with a write-once header.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use tablesift_shared::{NormalizedRecord, OUTPUT_COLUMNS, Result, TableSiftError};

/// Appends normalized records to a CSV destination.
///
/// The header row is written exactly once, before the first data row, no
/// matter how many tables are appended. A run that appends nothing still gets
/// the header on [`finish`](Self::finish).
pub struct OutputWriter<W: Write> {
    writer: csv::Writer<W>,
    dest: PathBuf,
    header_written: bool,
    rows_written: usize,
}

impl OutputWriter<File> {
    /// Create (or truncate) the CSV file at `path`.
    pub fn create(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            TableSiftError::setup(format!(
                "cannot open output file {}: {e}",
                path.display()
            ))
        })?;

        debug!(path = %path.display(), "output file created");
        Ok(Self::with_dest(file, delimiter, path.to_path_buf()))
    }
}

impl<W: Write> OutputWriter<W> {
    /// Wrap an arbitrary writer, e.g. an in-memory buffer.
    pub fn from_writer(inner: W, delimiter: u8) -> Self {
        Self::with_dest(inner, delimiter, PathBuf::from("<writer>"))
    }

    fn with_dest(inner: W, delimiter: u8, dest: PathBuf) -> Self {
        let writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .from_writer(inner);

        Self {
            writer,
            dest,
            header_written: false,
            rows_written: 0,
        }
    }

    /// Write the header row unless it has already been written.
    ///
    /// Returns `true` if this call wrote it.
    pub fn write_header_once(&mut self) -> Result<bool> {
        if self.header_written {
            return Ok(false);
        }
        self.writer
            .write_record(OUTPUT_COLUMNS)
            .map_err(|e| self.write_error(e))?;
        self.header_written = true;
        Ok(true)
    }

    /// Append records, writing the header first if needed.
    ///
    /// Returns the number of rows written.
    pub fn append_records(&mut self, records: &[NormalizedRecord]) -> Result<usize> {
        self.write_header_once()?;

        for record in records {
            self.writer
                .write_record(record.to_row())
                .map_err(|e| self.write_error(e))?;
        }
        self.rows_written += records.len();

        Ok(records.len())
    }

    pub fn header_written(&self) -> bool {
        self.header_written
    }

    /// Data rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Make sure the header exists, flush, and hand back the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.write_header_once()?;
        self.writer
            .flush()
            .map_err(|e| TableSiftError::io(&self.dest, e))?;

        let dest = self.dest;
        self.writer.into_inner().map_err(|e| {
            TableSiftError::io(dest, io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }

    fn write_error(&self, e: csv::Error) -> TableSiftError {
        TableSiftError::io(&self.dest, io::Error::from(e))
    }
}
