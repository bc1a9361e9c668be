//! Reshapes a raw extracted table into long-form records.
//!
//! Conventions for the report tables this tool targets:
//!
//! - row 0 is the title row (its label is resolved separately)
//! - the first row that survives cleaning is the header; its cells are the
//!   column keys
//! - column 0 of every later row is the row key, every other non-empty cell
//!   becomes one [`NormalizedRecord`]
//!
//! Cleaning runs in this order: symbol fusing, spacer-row removal, caption
//! removal, empty column removal. The normalizer is pure; writing is
//! [`crate::output`]'s job.

use tracing::{debug, instrument};

use tablesift_shared::{
    Cell, Label, NormalizedRecord, RawTable, Result, SourceRef, TableSiftError,
};

use crate::coerce::{CURRENCY_SIGNS, coerce};
use crate::title::TITLE_ROW;

/// Records produced from one table, plus counters for reporting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    pub records: Vec<NormalizedRecord>,
    /// Data rows left after cleaning (header excluded).
    pub data_rows: usize,
    /// Rows removed as blank, merged-cell duplicates, or header repeats.
    pub dropped_rows: usize,
}

impl NormalizedTable {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Normalize one table into records tagged with `label` and `source`.
///
/// A table with nothing below its title, or with a header but no data rows,
/// yields an empty [`NormalizedTable`]. Content without a usable header row
/// fails with [`TableSiftError::Structural`].
#[instrument(skip_all, fields(label = %label, source = %source))]
pub fn normalize_table(
    table: &RawTable,
    label: &Label,
    source: &SourceRef,
) -> Result<NormalizedTable> {
    let mut body: Vec<Vec<Cell>> = table.rows().iter().skip(TITLE_ROW + 1).cloned().collect();

    for row in &mut body {
        fuse_symbols(row);
    }

    if body.iter().flatten().all(Cell::is_empty) {
        debug!("no content below title row");
        return Ok(NormalizedTable::default());
    }

    let total_rows = body.len();
    let kept = drop_caption_row(drop_spacer_rows(body));
    let dropped_rows = total_rows - kept.len();
    let rows = drop_empty_columns(kept);

    let Some((header, data)) = rows.split_first() else {
        return Err(TableSiftError::structural("no rows left after cleaning"));
    };

    if !header.iter().skip(1).any(|c| !c.is_empty()) {
        return Err(TableSiftError::structural(format!(
            "header row has no column keys (width {})",
            header.len()
        )));
    }

    let keys: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(col, cell)| match cell.as_text() {
            Some(text) => text.to_string(),
            None => format!("column_{}", col + 1),
        })
        .collect();

    let mut records = Vec::new();
    for row in data {
        let row_key = row.first().and_then(Cell::as_text).unwrap_or_default();

        for (col, cell) in row.iter().enumerate().skip(1) {
            let Some(text) = cell.as_text() else {
                continue;
            };
            records.push(NormalizedRecord {
                label: label.clone(),
                row: row_key.to_string(),
                key: keys[col].clone(),
                value: coerce(text),
                source: source.clone(),
            });
        }
    }

    debug!(
        data_rows = data.len(),
        dropped_rows,
        records = records.len(),
        "table normalized"
    );

    Ok(NormalizedTable {
        records,
        data_rows: data.len(),
        dropped_rows,
    })
}

// ---------------------------------------------------------------------------
// Cleaning passes
// ---------------------------------------------------------------------------

/// Fold stand-alone `$` and `%` cells into the values they belong to.
///
/// Report generators split `$ 1,200` and `12.5 %` across cells. A lone
/// currency sign is blanked; a value followed by `%` or `%)` gets the `%`
/// appended (and `(` turned into a minus sign), and the follower is blanked.
/// A `%` with nothing to its left is blanked as well.
fn fuse_symbols(row: &mut [Cell]) {
    for j in 0..row.len() {
        if is_currency_sign(&row[j]) || is_percent_sign(&row[j]) {
            row[j] = Cell::Empty;
        }

        let Some(next) = row.get(j + 1) else {
            continue;
        };
        if !is_percent_sign(next) {
            continue;
        }
        let Some(value) = row[j].as_text() else {
            continue;
        };

        let fused = if value.contains('(') {
            format!("{}%", value.replace('(', "-").trim_end_matches(')'))
        } else {
            format!("{value}%")
        };
        row[j] = Cell::Text(fused);
        row[j + 1] = Cell::Empty;
    }
}

fn is_percent_sign(cell: &Cell) -> bool {
    matches!(cell.as_text(), Some("%") | Some("%)"))
}

fn is_currency_sign(cell: &Cell) -> bool {
    let mut chars = cell.as_text().unwrap_or_default().chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if CURRENCY_SIGNS.contains(&c))
}

/// Remove blank rows, merged-cell duplicates of the previous row, and
/// repeats of the header row.
fn drop_spacer_rows(rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let mut kept: Vec<Vec<Cell>> = Vec::with_capacity(rows.len());

    for row in rows {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        if let Some(prev) = kept.last() {
            if repeats(&row, prev) {
                continue;
            }
        }
        if let Some(header) = kept.first() {
            if repeats(&row, header) {
                continue;
            }
        }
        kept.push(row);
    }

    kept
}

/// True when every cell of `row` is empty or equal to the cell at the same
/// position in `other`.
fn repeats(row: &[Cell], other: &[Cell]) -> bool {
    row.iter()
        .enumerate()
        .all(|(i, cell)| cell.is_empty() || other.get(i) == Some(cell))
}

/// Drop a leading caption row such as `(In millions)`.
///
/// The first row is a caption when it holds a single value and the row after
/// it carries at least two column keys. A single-column header (one key over
/// one value per row) is left alone.
fn drop_caption_row(mut rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let is_caption = match rows.as_slice() {
        [first, next, ..] => {
            first.iter().filter(|c| !c.is_empty()).count() == 1
                && next.iter().skip(1).filter(|c| !c.is_empty()).count() >= 2
        }
        _ => false,
    };

    if is_caption {
        let caption = rows.remove(0);
        debug!(
            caption = caption.iter().find_map(Cell::as_text).unwrap_or_default(),
            "dropping caption row"
        );
    }
    rows
}

/// Drop columns at index 1 and above that are blank in every row, and pad
/// rows to a common width. Column 0 holds the row keys and is always kept.
fn drop_empty_columns(rows: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let used: Vec<usize> = (0..width)
        .filter(|&col| {
            col == 0 || rows.iter().any(|r| r.get(col).is_some_and(|c| !c.is_empty()))
        })
        .collect();

    rows.into_iter()
        .map(|row| {
            used.iter()
                .map(|&col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tablesift_shared::Value;

    fn label() -> Label {
        Label::new("Revenue Report")
    }

    fn source() -> SourceRef {
        SourceRef::new("reports/acme.html")
    }

    fn tuples(table: &NormalizedTable) -> Vec<(String, String, String, String)> {
        table
            .records
            .iter()
            .map(|r| (r.label.to_string(), r.row.clone(), r.key.clone(), r.value.to_string()))
            .collect()
    }

    fn t(label: &str, row: &str, key: &str, value: &str) -> (String, String, String, String) {
        (label.into(), row.into(), key.into(), value.into())
    }

    #[test]
    fn revenue_report_example() {
        let table = RawTable::from_strings([
            vec!["", "Revenue Report"],
            vec!["Year", "2021", "2022"],
            vec!["Sales", "100", "200"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();

        assert_eq!(out.records.len(), 2);
        let first = &out.records[0];
        assert_eq!(first.label, label());
        assert_eq!(first.row, "Sales");
        assert_eq!(first.key, "2021");
        assert_eq!(first.value, Value::Numeric(100.0));
        assert_eq!(first.source, source());

        let second = &out.records[1];
        assert_eq!(second.key, "2022");
        assert_eq!(second.value, Value::Numeric(200.0));
        assert_eq!(out.data_rows, 1);
        assert_eq!(out.dropped_rows, 0);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let table = RawTable::from_strings([
            vec!["", "Revenue Report"],
            vec!["Year", "2021", "2022"],
            vec!["Sales", "$", "1,100", "$", "1,300"],
            vec!["Costs", "(40)", "n/a"],
        ]);

        let a = normalize_table(&table, &label(), &source()).unwrap();
        let b = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_data_cell_appears_exactly_once() {
        let table = RawTable::from_strings([
            vec!["", "Segments"],
            vec!["Segment", "Q1", "Q2", "Q3"],
            vec!["Cloud", "10", "", "30"],
            vec!["Devices", "x", "y", "z"],
            vec!["Ads", "", "5", ""],
        ]);

        let out = normalize_table(&table, &Label::new("Segments"), &source()).unwrap();
        let mut values: Vec<String> = out.records.iter().map(|r| r.value.to_string()).collect();
        values.sort();
        assert_eq!(values, vec!["10", "30", "5", "x", "y", "z"]);
    }

    #[test]
    fn blank_table_yields_no_records() {
        let table = RawTable::from_strings([vec!["", ""], vec!["", "", ""], vec![""]]);
        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.data_rows, 0);
    }

    #[test]
    fn title_only_table_yields_no_records() {
        let table = RawTable::from_strings([vec!["", "Legend"]]);
        assert!(normalize_table(&table, &label(), &source()).unwrap().is_empty());
    }

    #[test]
    fn header_without_data_rows_yields_no_records() {
        let table = RawTable::from_strings([vec!["", "T"], vec!["Year", "2021", "2022"]]);
        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.data_rows, 0);
    }

    #[test]
    fn header_without_column_keys_is_structural_error() {
        let table = RawTable::from_strings([
            vec!["", "Notes"],
            vec!["Figures are unaudited."],
            vec!["See appendix."],
        ]);

        let err = normalize_table(&table, &label(), &source()).unwrap_err();
        assert!(matches!(err, TableSiftError::Structural { .. }), "got {err}");
    }

    #[test]
    fn spacer_and_duplicate_rows_are_dropped() {
        let table = RawTable::from_strings([
            vec!["", "Revenue Report"],
            vec!["", "", ""],
            vec!["Year", "2021", "2022"],
            vec!["Sales", "100", "200"],
            vec!["Sales", "", ""],
            vec!["", "100", "200"],
            vec!["Year", "2021", "2022"],
            vec!["Costs", "50", "60"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(
            tuples(&out),
            vec![
                t("Revenue Report", "Sales", "2021", "100"),
                t("Revenue Report", "Sales", "2022", "200"),
                t("Revenue Report", "Costs", "2021", "50"),
                t("Revenue Report", "Costs", "2022", "60"),
            ]
        );
        assert_eq!(out.data_rows, 2);
        assert_eq!(out.dropped_rows, 4);
    }

    #[test]
    fn repeated_header_after_data_is_dropped() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["Year", "2021"],
            vec!["Sales", "1"],
            vec!["Costs", "2"],
            vec!["Year", "2021"],
            vec!["Tax", "3"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        let rows: Vec<&str> = out.records.iter().map(|r| r.row.as_str()).collect();
        assert_eq!(rows, vec!["Sales", "Costs", "Tax"]);
    }

    #[test]
    fn currency_and_percent_cells_are_fused() {
        let table = RawTable::from_strings([
            vec!["", "Revenue Report"],
            vec!["Year", "", "2021", "", "2022", ""],
            vec!["Sales", "$", "1,200", "$", "1,450", ""],
            vec!["Margin", "", "12.5", "%", "(3.1", "%)"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(
            tuples(&out),
            vec![
                t("Revenue Report", "Sales", "2021", "1200"),
                t("Revenue Report", "Sales", "2022", "1450"),
                t("Revenue Report", "Margin", "2021", "12.5%"),
                t("Revenue Report", "Margin", "2022", "-3.1%"),
            ]
        );
        assert!(out.records[0].value.is_numeric());
        assert!(!out.records[2].value.is_numeric());
    }

    #[test]
    fn blank_header_cell_gets_positional_key() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["Item", "Amount", ""],
            vec!["Rent", "900", "monthly"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        let keys: Vec<&str> = out.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Amount", "column_3"]);
    }

    #[test]
    fn blank_row_key_is_kept_empty() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["", "2021"],
            vec!["Sales", "7"],
            vec!["", "8"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[1].row, "");
        assert_eq!(out.records[1].value, Value::Numeric(8.0));
    }

    #[test]
    fn ragged_rows_are_padded() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["Year", "2021", "2022"],
            vec!["Sales", "5"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(tuples(&out), vec![t("Revenue Report", "Sales", "2021", "5")]);
    }

    #[test]
    fn fuse_symbols_blanks_lone_percent() {
        let mut row: Vec<Cell> = ["", "%", "5", "%)"].iter().map(|s| Cell::from_text(s)).collect();
        fuse_symbols(&mut row);
        assert_eq!(row[1], Cell::Empty);
        assert_eq!(row[2], Cell::Text("5%".into()));
        assert_eq!(row[3], Cell::Empty);
    }

    #[test]
    fn lone_percent_cell_emits_no_record() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["Year", "2021", "", "2022"],
            vec!["Margin", "", "%", "7"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        assert_eq!(tuples(&out), vec![t("Revenue Report", "Margin", "2022", "7")]);
    }

    #[test]
    fn blank_key_column_is_kept() {
        let table = RawTable::from_strings([
            vec!["", "Prices"],
            vec!["", "Q1", "Q2"],
            vec!["", "5", "6"],
        ]);

        let out = normalize_table(&table, &Label::new("Prices"), &source()).unwrap();
        assert_eq!(
            tuples(&out),
            vec![t("Prices", "", "Q1", "5"), t("Prices", "", "Q2", "6")]
        );
    }

    #[test]
    fn caption_row_above_header_is_dropped() {
        let table = RawTable::from_strings([
            vec!["", "Income"],
            vec!["", "(In millions)", ""],
            vec!["Year", "2021", "2022"],
            vec!["Sales", "1", "2"],
        ]);

        let out = normalize_table(&table, &Label::new("Income"), &source()).unwrap();
        assert_eq!(
            tuples(&out),
            vec![t("Income", "Sales", "2021", "1"), t("Income", "Sales", "2022", "2")]
        );
        assert_eq!(out.data_rows, 1);
        assert_eq!(out.dropped_rows, 1);
    }

    #[test]
    fn single_key_header_is_not_a_caption() {
        let table = RawTable::from_strings([
            vec!["", "T"],
            vec!["Item", "Amount"],
            vec!["Rent", "900"],
            vec!["Power", "120"],
        ]);

        let out = normalize_table(&table, &label(), &source()).unwrap();
        let keys: Vec<&str> = out.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Amount", "Amount"]);
    }
}
