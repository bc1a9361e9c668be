//! Core domain types: raw tables, labels, coerced values, output records.

use std::fmt;
use std::path::{Path, PathBuf};

/// Output column names, in the order they are written.
pub const OUTPUT_COLUMNS: [&str; 5] = ["label", "row", "key", "value", "source"];

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single untyped cell of an extracted table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cell {
    /// Non-blank text, already trimmed.
    Text(String),
    /// Blank or missing content.
    #[default]
    Empty,
}

impl Cell {
    /// Build a cell from raw text; blank text becomes [`Cell::Empty`].
    pub fn from_text(text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            Self::Empty
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// The cell text, or `None` when empty.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Empty => None,
        }
    }

    /// Whether the cell carries no content.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

// ---------------------------------------------------------------------------
// RawTable
// ---------------------------------------------------------------------------

/// Rows of untyped cells, as extracted from one HTML `<table>`.
///
/// Rows may have different lengths; lookups past the end of a row yield `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Build a table from string literals, mostly for tests and fixtures.
    pub fn from_strings<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Cell::from_text).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Text at `(row, col)`, or `None` if absent or empty.
    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).and_then(Cell::as_text)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// True when no cell in the table carries content.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_empty)
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }
}

// ---------------------------------------------------------------------------
// SourceRef / Label
// ---------------------------------------------------------------------------

/// The file a table was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    path: PathBuf,
}

impl SourceRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name only, as written to the `source` output column.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Per-table category tag taken from the title cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Value / NormalizedRecord
// ---------------------------------------------------------------------------

/// A cell value after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Numeric(f64),
    Text(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// One long-form output row: a single data cell with its keys and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Table label from the title cell.
    pub label: Label,
    /// Row key from column 0 of the data row (empty when blank).
    pub row: String,
    /// Column key from the header row.
    pub key: String,
    pub value: Value,
    pub source: SourceRef,
}

impl NormalizedRecord {
    /// Cells in [`OUTPUT_COLUMNS`] order.
    pub fn to_row(&self) -> [String; 5] {
        [
            self.label.to_string(),
            self.row.clone(),
            self.key.clone(),
            self.value.to_string(),
            self.source.file_name(),
        ]
    }
}
