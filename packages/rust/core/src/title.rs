//! Table label lookup from the fixed title cell.

use tablesift_shared::{Label, RawTable, Result, TableSiftError};

/// Row holding the table title.
pub const TITLE_ROW: usize = 0;

/// Column holding the table title; column 0 of the title row is usually blank.
pub const TITLE_COLUMN: usize = 1;

/// Return the trimmed text at row 0, column 1 as the table's label.
///
/// Fails with [`TableSiftError::MissingTitle`] when the table has no rows,
/// the first row has fewer than two columns, or the cell is blank.
pub fn resolve_title(table: &RawTable) -> Result<Label> {
    let first = table
        .row(TITLE_ROW)
        .ok_or_else(|| TableSiftError::missing_title("table has no rows"))?;

    if first.len() <= TITLE_COLUMN {
        return Err(TableSiftError::missing_title(format!(
            "first row has {} column(s), title expected in column {}",
            first.len(),
            TITLE_COLUMN + 1
        )));
    }

    match table.text(TITLE_ROW, TITLE_COLUMN).map(str::trim) {
        Some(title) if !title.is_empty() => Ok(Label::new(title)),
        _ => Err(TableSiftError::missing_title("title cell is empty")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablesift_shared::Cell;

    #[test]
    fn reads_row_zero_column_one() {
        let table = RawTable::from_strings([vec!["", "Revenue Report"], vec!["Year", "2021"]]);
        assert_eq!(resolve_title(&table).unwrap(), Label::new("Revenue Report"));
    }

    #[test]
    fn title_is_trimmed() {
        let table = RawTable::new(vec![vec![
            Cell::Empty,
            Cell::Text("  Balance Sheet \t".into()),
        ]]);
        assert_eq!(resolve_title(&table).unwrap().as_str(), "Balance Sheet");
    }

    #[test]
    fn empty_table_has_no_title() {
        let err = resolve_title(&RawTable::default()).unwrap_err();
        assert!(matches!(err, TableSiftError::MissingTitle { .. }));
        assert!(err.to_string().contains("no rows"));
    }

    #[test]
    fn single_column_first_row_has_no_title() {
        let table = RawTable::from_strings([vec!["Only"], vec!["a", "b"]]);
        let err = resolve_title(&table).unwrap_err();
        assert!(matches!(err, TableSiftError::MissingTitle { .. }));
    }

    #[test]
    fn blank_title_cell_fails() {
        let table = RawTable::from_strings([vec!["Year", "  "], vec!["a", "b"]]);
        assert!(matches!(
            resolve_title(&table),
            Err(TableSiftError::MissingTitle { .. })
        ));
    }

    #[test]
    fn title_in_column_zero_is_not_used() {
        let table = RawTable::from_strings([vec!["Income Statement", ""]]);
        assert!(resolve_title(&table).is_err());
    }
}
