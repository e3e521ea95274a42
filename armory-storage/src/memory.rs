//! In-memory ledger store
//!
//! A grid-faithful fake of the spreadsheet service: ragged used ranges,
//! a fixed column limit that only `add_cols` widens, rows that grow on demand
//! and appends that land after the last non-blank row. Writes to a chosen
//! worksheet can be made to fail so partial-failure paths are testable.

use crate::{LedgerStore, StoreResult};
use ::async_trait::async_trait;
use armory_core::{SheetSnapshot, StorageError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Clone)]
struct Worksheet {
    title: String,
    cells: Vec<Vec<String>>,
    rows: usize,
    cols: usize,
}

impl Worksheet {
    fn new(title: &str, rows: usize, cols: usize) -> Self {
        Self {
            title: title.to_string(),
            cells: Vec::new(),
            rows,
            cols,
        }
    }

    fn seeded(title: &str, cells: Vec<Vec<String>>) -> Self {
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        let rows = cells.len().max(1);
        Self {
            title: title.to_string(),
            cells,
            rows,
            cols,
        }
    }

    /// Used range with trailing blank cells and rows removed.
    fn used_range(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = self.cells.iter().map(|r| trim_trailing(r)).collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        rows
    }

    fn check_bounds(&self, row: usize, col: usize) -> StoreResult<()> {
        if row == 0 || col == 0 || col > self.cols {
            return Err(StorageError::OutOfGrid {
                worksheet: self.title.clone(),
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn set(&mut self, row: usize, col: usize, value: &str) {
        if self.cells.len() < row {
            self.cells.resize(row, Vec::new());
        }
        self.rows = self.rows.max(row);
        let cells = &mut self.cells[row - 1];
        if cells.len() < col {
            cells.resize(col, String::new());
        }
        cells[col - 1] = value.to_string();
    }

    fn write_row(&mut self, row: usize, values: Vec<String>) {
        if self.cells.len() < row {
            self.cells.resize(row, Vec::new());
        }
        self.rows = self.rows.max(row);
        self.cols = self.cols.max(values.len());
        self.cells[row - 1] = values;
    }
}

fn trim_trailing(row: &[String]) -> Vec<String> {
    let end = row
        .iter()
        .rposition(|c| !c.is_empty())
        .map(|i| i + 1)
        .unwrap_or(0);
    row[..end].to_vec()
}

/// In-memory `LedgerStore` used by tests and the `memory` store mode.
///
/// Clones share the same grid.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    sheets: Arc<RwLock<Vec<Worksheet>>>,
    /// Worksheet -> whether the injected write fault persists.
    faults: Arc<RwLock<HashMap<String, bool>>>,
    offline: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`InMemoryLedger::seed`].
    pub fn with_sheet(self, title: &str, rows: Vec<Vec<String>>) -> Self {
        self.seed(title, rows);
        self
    }

    /// Create or replace a worksheet with the given cells. The grid is sized
    /// to fit them exactly.
    pub fn seed(&self, title: &str, rows: Vec<Vec<String>>) {
        let mut sheets = self.sheets.write().unwrap_or_else(PoisonError::into_inner);
        let sheet = Worksheet::seeded(title, rows);
        match sheets.iter_mut().find(|s| s.title == title) {
            Some(existing) => *existing = sheet,
            None => sheets.push(sheet),
        }
    }

    /// Current used range of a worksheet, for assertions.
    pub fn snapshot_of(&self, title: &str) -> Option<SheetSnapshot> {
        let sheets = self.sheets.read().unwrap_or_else(PoisonError::into_inner);
        sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| SheetSnapshot::new(title, s.used_range()))
    }

    /// Grid size `(rows, cols)` of a worksheet.
    pub fn grid_size(&self, title: &str) -> Option<(usize, usize)> {
        let sheets = self.sheets.read().unwrap_or_else(PoisonError::into_inner);
        sheets
            .iter()
            .find(|s| s.title == title)
            .map(|s| (s.rows, s.cols))
    }

    /// Fail the next write to `sheet` with `StoreUnavailable`.
    pub fn fail_next_write(&self, sheet: &str) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sheet.to_string(), false);
    }

    /// Fail every write to `sheet` until faults are cleared.
    pub fn fail_writes(&self, sheet: &str) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sheet.to_string(), true);
    }

    pub fn clear_faults(&self) {
        self.faults
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make every call, reads included, fail as if the service were down.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of successful write calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_online(&self, operation: &str) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable(operation, "store offline"));
        }
        Ok(())
    }

    fn check_fault(&self, sheet: &str, operation: &str) -> StoreResult<()> {
        self.check_online(operation)?;
        let mut faults = self.faults.write().map_err(|_| StorageError::LockPoisoned)?;
        match faults.get(sheet).copied() {
            Some(persistent) => {
                if !persistent {
                    faults.remove(sheet);
                }
                Err(StorageError::unavailable(
                    operation,
                    format!("injected fault on {}", sheet),
                ))
            }
            None => Ok(()),
        }
    }

    fn read<T>(&self, sheet: &str, operation: &str, f: impl FnOnce(&Worksheet) -> T) -> StoreResult<T> {
        self.check_online(operation)?;
        let sheets = self.sheets.read().map_err(|_| StorageError::LockPoisoned)?;
        let ws = sheets
            .iter()
            .find(|s| s.title == sheet)
            .ok_or_else(|| StorageError::worksheet_not_found(sheet))?;
        Ok(f(ws))
    }

    fn write(
        &self,
        sheet: &str,
        operation: &str,
        f: impl FnOnce(&mut Worksheet) -> StoreResult<()>,
    ) -> StoreResult<()> {
        self.check_fault(sheet, operation)?;
        let mut sheets = self.sheets.write().map_err(|_| StorageError::LockPoisoned)?;
        let ws = sheets
            .iter_mut()
            .find(|s| s.title == sheet)
            .ok_or_else(|| StorageError::worksheet_not_found(sheet))?;
        f(ws)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn worksheet_titles(&self) -> StoreResult<Vec<String>> {
        self.check_online("worksheet_titles")?;
        let sheets = self.sheets.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(sheets.iter().map(|s| s.title.clone()).collect())
    }

    async fn create_worksheet(&self, title: &str, rows: usize, cols: usize) -> StoreResult<()> {
        self.check_fault(title, "create_worksheet")?;
        let mut sheets = self.sheets.write().map_err(|_| StorageError::LockPoisoned)?;
        if sheets.iter().any(|s| s.title == title) {
            return Err(StorageError::AlreadyExists {
                worksheet: title.to_string(),
            });
        }
        sheets.push(Worksheet::new(title, rows.max(1), cols.max(1)));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn all_values(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>> {
        self.read(sheet, "all_values", Worksheet::used_range)
    }

    async fn row_values(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>> {
        self.read(sheet, "row_values", |ws| {
            row.checked_sub(1)
                .and_then(|r| ws.cells.get(r))
                .map(|r| trim_trailing(r))
                .unwrap_or_default()
        })
    }

    async fn col_values(&self, sheet: &str, col: usize) -> StoreResult<Vec<String>> {
        self.read(sheet, "col_values", |ws| {
            let Some(c) = col.checked_sub(1) else {
                return Vec::new();
            };
            let mut values: Vec<String> = ws
                .used_range()
                .iter()
                .map(|r| r.get(c).cloned().unwrap_or_default())
                .collect();
            while values.last().is_some_and(String::is_empty) {
                values.pop();
            }
            values
        })
    }

    async fn cell(&self, sheet: &str, row: usize, col: usize) -> StoreResult<String> {
        self.read(sheet, "cell", |ws| {
            row.checked_sub(1)
                .zip(col.checked_sub(1))
                .and_then(|(r, c)| ws.cells.get(r).and_then(|cells| cells.get(c)))
                .cloned()
                .unwrap_or_default()
        })
    }

    async fn update_cell(
        &self,
        sheet: &str,
        row: usize,
        col: usize,
        value: &str,
    ) -> StoreResult<()> {
        self.write(sheet, "update_cell", |ws| {
            ws.check_bounds(row, col)?;
            ws.set(row, col, value);
            Ok(())
        })
    }

    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> StoreResult<()> {
        self.write(sheet, "append_rows", |ws| {
            let mut next = ws.used_range().len() + 1;
            for values in rows {
                ws.write_row(next, values);
                next += 1;
            }
            Ok(())
        })
    }

    async fn insert_row(&self, sheet: &str, values: Vec<String>, index: usize) -> StoreResult<()> {
        self.write(sheet, "insert_row", |ws| {
            if index == 0 {
                return Err(StorageError::OutOfGrid {
                    worksheet: ws.title.clone(),
                    row: index,
                    col: 1,
                    rows: ws.rows,
                    cols: ws.cols,
                });
            }
            if ws.cells.len() < index - 1 {
                ws.cells.resize(index - 1, Vec::new());
            }
            ws.cols = ws.cols.max(values.len());
            ws.cells.insert(index - 1, values);
            ws.rows = (ws.rows + 1).max(ws.cells.len());
            Ok(())
        })
    }

    async fn add_cols(&self, sheet: &str, count: usize) -> StoreResult<()> {
        self.write(sheet, "add_cols", |ws| {
            ws.cols += count;
            Ok(())
        })
    }

    async fn clear(&self, sheet: &str) -> StoreResult<()> {
        self.write(sheet, "clear", |ws| {
            ws.cells.clear();
            Ok(())
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn make_test_ledger() -> InMemoryLedger {
        InMemoryLedger::new().with_sheet(
            "stock",
            vec![row(&["M4", "M16"]), row(&["100", "200"]), row(&["101", ""])],
        )
    }

    #[tokio::test]
    async fn test_all_values_trims_ragged_rows() {
        let store = make_test_ledger();
        let rows = store.all_values("stock").await.unwrap();
        assert_eq!(rows, vec![row(&["M4", "M16"]), row(&["100", "200"]), row(&["101"])]);
    }

    #[tokio::test]
    async fn test_update_cell_beyond_column_limit_is_out_of_grid() {
        let store = make_test_ledger();
        let err = store.update_cell("stock", 1, 3, "X").await.unwrap_err();
        assert!(matches!(err, StorageError::OutOfGrid { col: 3, cols: 2, .. }));

        store.add_cols("stock", 1).await.unwrap();
        store.update_cell("stock", 1, 3, "X").await.unwrap();
        assert_eq!(store.cell("stock", 1, 3).await.unwrap(), "X");
    }

    #[tokio::test]
    async fn test_update_cell_grows_rows() {
        let store = make_test_ledger();
        store.update_cell("stock", 10, 1, "900").await.unwrap();
        assert_eq!(store.col_values("stock", 1).await.unwrap().len(), 10);
        assert_eq!(store.grid_size("stock"), Some((10, 2)));
    }

    #[tokio::test]
    async fn test_append_lands_after_last_non_blank_row() {
        let store = make_test_ledger();
        store.update_cell("stock", 3, 1, "").await.unwrap();
        store.append_row("stock", row(&["102"])).await.unwrap();
        let col = store.col_values("stock", 1).await.unwrap();
        assert_eq!(col, row(&["M4", "100", "102"]));
    }

    #[tokio::test]
    async fn test_insert_row_shifts_later_rows() {
        let store = make_test_ledger();
        store.insert_row("stock", row(&["new"]), 2).await.unwrap();
        let col = store.col_values("stock", 1).await.unwrap();
        assert_eq!(col, row(&["M4", "new", "100", "101"]));
    }

    #[tokio::test]
    async fn test_missing_worksheet() {
        let store = InMemoryLedger::new();
        let err = store.all_values("nope").await.unwrap_err();
        assert_eq!(err, StorageError::worksheet_not_found("nope"));
        assert!(!store.has_worksheet("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_worksheet_rejects_duplicates() {
        let store = InMemoryLedger::new();
        store.create_worksheet("א", 100, 8).await.unwrap();
        let err = store.create_worksheet("א", 100, 8).await.unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { .. }));
        assert_eq!(store.worksheet_titles().await.unwrap(), vec!["א"]);
        assert_eq!(store.grid_size("א"), Some((100, 8)));
    }

    #[tokio::test]
    async fn test_one_shot_fault_fails_once() {
        let store = make_test_ledger();
        store.fail_next_write("stock");
        let err = store.update_cell("stock", 2, 1, "x").await.unwrap_err();
        assert!(matches!(err, StorageError::StoreUnavailable { .. }));
        store.update_cell("stock", 2, 1, "x").await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_persistent_fault_leaves_reads_working() {
        let store = make_test_ledger();
        store.fail_writes("stock");
        assert!(store.append_row("stock", row(&["1"])).await.is_err());
        assert!(store.append_row("stock", row(&["1"])).await.is_err());
        assert_eq!(store.all_values("stock").await.unwrap().len(), 3);
        store.clear_faults();
        store.append_row("stock", row(&["1"])).await.unwrap();
    }

    #[tokio::test]
    async fn test_offline_fails_reads() {
        let store = make_test_ledger();
        store.set_offline(true);
        assert!(store.worksheet_titles().await.is_err());
        store.set_offline(false);
        assert!(store.worksheet_titles().await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_empties_used_range() {
        let store = make_test_ledger();
        store.clear("stock").await.unwrap();
        assert!(store.all_values("stock").await.unwrap().is_empty());
        assert_eq!(store.snapshot_of("stock").unwrap().row_count(), 0);
    }
}
