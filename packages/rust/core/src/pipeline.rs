//! End-to-end batch run: folder → extract → resolve title → normalize → CSV.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use tablesift_extract::ExtractedTable;
use tablesift_shared::{Result, RunConfig, SourceRef, TableSiftError};

use crate::discover::discover_files;
use crate::normalize::normalize_table;
use crate::output::OutputWriter;
use crate::title::resolve_title;

/// Why a file or table contributed no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipKind {
    /// The file could not be parsed; all its tables are lost.
    Parse,
    /// Every cell of the table is blank.
    BlankTable,
    /// The title cell is absent or empty.
    MissingTitle,
    /// No usable header row after cleaning.
    Structural,
    /// A header but no data rows.
    NoData,
}

impl SkipKind {
    /// Whether this skip is a reported error rather than an expected empty table.
    pub fn is_error(self) -> bool {
        matches!(self, Self::Parse | Self::MissingTitle | Self::Structural)
    }

    /// Skip kind for a table-level error; `None` for errors that end the run.
    fn from_error(err: &TableSiftError) -> Option<Self> {
        match err {
            TableSiftError::Parse { .. } => Some(Self::Parse),
            TableSiftError::MissingTitle { .. } => Some(Self::MissingTitle),
            TableSiftError::Structural { .. } => Some(Self::Structural),
            TableSiftError::Setup { .. }
            | TableSiftError::Config { .. }
            | TableSiftError::Io { .. } => None,
        }
    }
}

/// A file or table skipped during the run.
#[derive(Debug, Clone)]
pub struct Skip {
    pub source: SourceRef,
    /// Table index within the file; `None` when the whole file was skipped.
    pub table: Option<usize>,
    pub kind: SkipKind,
    pub reason: String,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(index) => write!(
                f,
                "{} table #{}: {}",
                self.source.file_name(),
                index,
                self.reason
            ),
            None => write!(f, "{}: {}", self.source.file_name(), self.reason),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files_detected: usize,
    pub files_parsed: usize,
    pub tables_found: usize,
    pub tables_written: usize,
    pub records_written: usize,
    pub skipped: Vec<Skip>,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Skips that are errors (as opposed to expected empty tables).
    pub fn errors(&self) -> impl Iterator<Item = &Skip> {
        self.skipped.iter().filter(|s| s.kind.is_error())
    }
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called once with every input file found.
    fn files_detected(&self, files: &[PathBuf]);
    /// Called before a file is extracted.
    fn file_extracting(&self, path: &Path, current: usize, total: usize);
    /// Called after a file was extracted successfully.
    fn file_extracted(&self, path: &Path, tables: usize);
    /// Called before a table is cleaned.
    fn table_cleaning(&self, source: &SourceRef, index: usize, current: usize, total: usize);
    /// Called after a table's records were appended.
    fn table_written(&self, source: &SourceRef, index: usize, records: usize);
    /// Called when a file or table is skipped.
    fn skipped(&self, skip: &Skip);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn files_detected(&self, _files: &[PathBuf]) {}
    fn file_extracting(&self, _path: &Path, _current: usize, _total: usize) {}
    fn file_extracted(&self, _path: &Path, _tables: usize) {}
    fn table_cleaning(&self, _source: &SourceRef, _index: usize, _current: usize, _total: usize) {}
    fn table_written(&self, _source: &SourceRef, _index: usize, _records: usize) {}
    fn skipped(&self, _skip: &Skip) {}
    fn done(&self, _summary: &RunSummary) {}
}

/// Run the full batch over `config.input_dir`, writing `config.output_file`.
///
/// 1. Discover input files
/// 2. Open the output table
/// 3. Extract tables from every file
/// 4. Resolve titles, normalize, append
///
/// Only setup failures and output write failures return `Err`; everything
/// else is recorded in [`RunSummary::skipped`].
#[instrument(skip_all, fields(input = %config.input_dir.display(), output = %config.output_file.display()))]
pub fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunSummary> {
    let start = Instant::now();

    // --- Phase 1: Discovery ---
    let files = discover_files(&config.input_dir, &config.extensions)?;
    info!(count = files.len(), "detected input files");
    if files.is_empty() {
        warn!("no matching input files found");
    }
    progress.files_detected(&files);

    // --- Phase 2: Output ---
    let mut writer = OutputWriter::create(&config.output_file, config.delimiter)?;

    // --- Phases 3-4 ---
    let mut summary = process_files(&files, &mut writer, progress)?;
    writer.finish()?;

    summary.elapsed = start.elapsed();
    info!(
        files = summary.files_detected,
        tables = summary.tables_found,
        written = summary.tables_written,
        records = summary.records_written,
        skipped = summary.skipped.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run complete"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Extract every file, then clean and append every table to `writer`.
pub fn process_files<W: Write>(
    files: &[PathBuf],
    writer: &mut OutputWriter<W>,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let mut summary = RunSummary {
        files_detected: files.len(),
        ..RunSummary::default()
    };

    // --- Phase 3: Extract ---
    let mut tables: Vec<ExtractedTable> = Vec::new();
    for (i, path) in files.iter().enumerate() {
        progress.file_extracting(path, i + 1, files.len());

        match tablesift_extract::extract_file(path) {
            Ok(found) => {
                info!(path = %path.display(), tables = found.len(), "extracted file");
                progress.file_extracted(path, found.len());
                summary.files_parsed += 1;
                tables.extend(found);
            }
            Err(e) => {
                let skip = Skip {
                    source: SourceRef::new(path),
                    table: None,
                    kind: SkipKind::Parse,
                    reason: e.to_string(),
                };
                warn!(path = %path.display(), error = %e, "cannot parse file, skipping");
                progress.skipped(&skip);
                summary.skipped.push(skip);
            }
        }
    }
    summary.tables_found = tables.len();

    // --- Phase 4: Clean and append ---
    let total = tables.len();
    for (i, extracted) in tables.iter().enumerate() {
        progress.table_cleaning(&extracted.source, extracted.index, i + 1, total);

        match clean_table(extracted, writer)? {
            Ok(records) => {
                progress.table_written(&extracted.source, extracted.index, records);
                summary.tables_written += 1;
                summary.records_written += records;
            }
            Err(skip) => {
                progress.skipped(&skip);
                summary.skipped.push(skip);
            }
        }
    }

    Ok(summary)
}

/// Resolve, normalize and append one table.
///
/// The outer `Result` carries fatal write errors; the inner one is either the
/// number of records written or the reason the table was skipped.
fn clean_table<W: Write>(
    extracted: &ExtractedTable,
    writer: &mut OutputWriter<W>,
) -> Result<std::result::Result<usize, Skip>> {
    let ExtractedTable {
        table,
        source,
        index,
    } = extracted;

    let skip = |kind: SkipKind, reason: String| Skip {
        source: source.clone(),
        table: Some(*index),
        kind,
        reason,
    };

    if table.is_blank() {
        info!(source = %source, table = index, "blank table, skipping");
        return Ok(Err(skip(SkipKind::BlankTable, "table is blank".into())));
    }

    let normalized = resolve_title(table)
        .and_then(|label| normalize_table(table, &label, source));

    let normalized = match normalized {
        Ok(n) => n,
        Err(e) => {
            let Some(kind) = SkipKind::from_error(&e) else {
                return Err(e);
            };
            warn!(source = %source, table = index, error = %e, "skipping table");
            return Ok(Err(skip(kind, e.to_string())));
        }
    };

    if normalized.is_empty() {
        info!(source = %source, table = index, "no data rows, skipping");
        return Ok(Err(skip(SkipKind::NoData, "no data rows".into())));
    }

    let written = writer.append_records(&normalized.records)?;
    info!(source = %source, table = index, records = written, "table written");
    Ok(Ok(written))
}
