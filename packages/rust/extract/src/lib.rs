//! HTML table extraction.
//!
//! Reads an HTML file, finds every `<table>` in document order, and turns each
//! one into a [`RawTable`] of cleaned text cells. Parsing is delegated to
//! `scraper` (html5ever), which recovers from broken markup the way browsers
//! do, so the only hard failures are unreadable or non-text input.

mod cleanup;

use std::path::Path;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, instrument};

use tablesift_shared::{Cell, RawTable, Result, SourceRef, TableSiftError};

/// Upper bound on `colspan` padding, to keep hostile markup from exploding a row.
const MAX_COLSPAN: usize = 64;

static TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid selector"));
static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One table found in a file, with its provenance.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    /// The extracted cells.
    pub table: RawTable,
    /// File the table came from.
    pub source: SourceRef,
    /// Zero-based position of the table within its file.
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract every table in the HTML file at `path`.
///
/// A file with no tables yields an empty vector. A file that cannot be read,
/// is not valid UTF-8, or contains NUL bytes fails with
/// [`TableSiftError::Parse`].
#[instrument(skip_all, fields(path = %path.display()))]
pub fn extract_file(path: &Path) -> Result<Vec<ExtractedTable>> {
    let bytes = std::fs::read(path)
        .map_err(|e| TableSiftError::parse(path, format!("cannot read file: {e}")))?;

    let html = decode_html(path, &bytes)?;
    let source = SourceRef::new(path);

    let tables: Vec<ExtractedTable> = parse_tables(html)
        .into_iter()
        .enumerate()
        .map(|(index, table)| ExtractedTable {
            table,
            source: source.clone(),
            index,
        })
        .collect();

    debug!(tables = tables.len(), "extraction complete");
    Ok(tables)
}

/// Parse an HTML string and return its tables in document order.
pub fn parse_tables(html: &str) -> Vec<RawTable> {
    let doc = Html::parse_document(html);

    if !doc.errors.is_empty() {
        debug!(count = doc.errors.len(), "html parser recovered from markup errors");
    }

    doc.select(&TABLE_SEL).map(|table| table_to_raw(&table)).collect()
}

/// Validate and decode file bytes as UTF-8 HTML text.
fn decode_html<'a>(path: &Path, bytes: &'a [u8]) -> Result<&'a str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    if let Some(pos) = bytes.iter().position(|b| *b == 0) {
        return Err(TableSiftError::parse(
            path,
            format!("binary content (NUL byte at offset {pos})"),
        ));
    }

    std::str::from_utf8(bytes).map_err(|e| {
        TableSiftError::parse(
            path,
            format!("not valid UTF-8 (at byte {})", e.valid_up_to()),
        )
    })
}

/// Convert one `<table>` element into rows of cells.
///
/// Only rows owned by this table are taken; rows of nested tables belong to
/// those tables, which are extracted separately.
fn table_to_raw(table: &ElementRef) -> RawTable {
    let rows = table
        .select(&ROW_SEL)
        .filter(|tr| owning_table(tr).map(|t| t.id()) == Some(table.id()))
        .map(|tr| row_cells(&tr))
        .collect();

    RawTable::new(rows)
}

/// Nearest `<table>` ancestor of an element.
fn owning_table<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

/// Cells of one `<tr>`, with `colspan` padded out as empty cells.
fn row_cells(tr: &ElementRef) -> Vec<Cell> {
    let mut cells = Vec::new();

    for cell in tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
    {
        cells.push(Cell::from_text(cleanup::clean_cell_text(&cell_text(&cell))));

        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        cells.extend(std::iter::repeat_n(Cell::Empty, span - 1));
    }

    cells
}

/// Text of a cell with text nodes joined as-is, so inline markup inside a
/// number (`1,<b>234</b>`) does not split it. Line breaks and block elements
/// separate words with a space.
fn cell_text(cell: &ElementRef) -> String {
    let mut text = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(el) if is_break(el.name()) => text.push(' '),
            _ => {}
        }
    }
    text
}

fn is_break(name: &str) -> bool {
    matches!(name, "br" | "p" | "div" | "li" | "tr" | "td" | "th" | "table")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
