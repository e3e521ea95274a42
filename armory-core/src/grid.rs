//! Worksheet grid model
//!
//! A `SheetSnapshot` is one read of a worksheet's used range. Row 1 is the
//! header row; every later row is a record, except a trailing summary row
//! marked by [`SUMMARY_ROW_LABEL`] in its first cell. All coordinates are
//! 1-based, matching the upstream spreadsheet service.

use serde::{Deserialize, Serialize};

/// Sentinel in the first cell of a reserved trailing summary row.
pub const SUMMARY_ROW_LABEL: &str = "סיכום";

/// A read-only copy of a worksheet's cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SheetSnapshot {
    pub title: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetSnapshot {
    pub fn new(title: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.into(),
            rows,
        }
    }

    /// Header row, empty when the sheet has no rows at all.
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// 1-based column of `name` in the header row.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        column_index(self.headers(), name)
    }

    /// Number of rows in the used range, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell text at a 1-based coordinate; ragged or absent cells read as blank.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        if row == 0 || col == 0 {
            return "";
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has_summary_row(&self) -> bool {
        self.rows.len() > 1
            && self
                .rows
                .last()
                .and_then(|r| r.first())
                .is_some_and(|c| c.trim() == SUMMARY_ROW_LABEL)
    }

    /// Last 1-based row that holds a record (summary row excluded).
    pub fn last_data_row(&self) -> usize {
        if self.has_summary_row() {
            self.rows.len() - 1
        } else {
            self.rows.len()
        }
    }

    /// Record rows as `(row_index, cells)`, skipping the header and summary row.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[String])> + '_ {
        let end = self.last_data_row();
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .take(end.saturating_sub(1))
            .map(|(i, r)| (i + 1, r.as_slice()))
    }

    /// Row index at which a new record must be inserted: just before the
    /// summary row when present, otherwise after the last row.
    pub fn append_index(&self) -> usize {
        // An empty sheet still reserves row 1 for the header.
        self.last_data_row().max(1) + 1
    }

    /// Values of one column over the record rows, `(row_index, value)`.
    pub fn column_cells(&self, col: usize) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.data_rows()
            .map(move |(row, cells)| {
                let value = col
                    .checked_sub(1)
                    .and_then(|c| cells.get(c))
                    .map(String::as_str)
                    .unwrap_or("");
                (row, value)
            })
    }
}

/// Linear lookup of a header name; header order is column order.
pub fn column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name).map(|i| i + 1)
}

/// A1-notation letters for a 1-based column (1 -> A, 27 -> AA).
pub fn column_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// Pads `row` with blanks up to `width` cells.
pub fn pad_row(mut row: Vec<String>, width: usize) -> Vec<String> {
    if row.len() < width {
        row.resize(width, String::new());
    }
    row
}
