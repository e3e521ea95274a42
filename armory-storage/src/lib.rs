//! Armory Storage - Ledger Store Trait and In-Memory Implementation
//!
//! Defines the narrow worksheet interface the ledger is built on. The
//! Google Sheets implementation lives in armory-api; `InMemoryLedger` is the
//! fake grid used by tests and by the `memory` store mode.

pub mod memory;

pub use memory::InMemoryLedger;

use ::async_trait::async_trait;
use armory_core::{SheetSnapshot, StorageError};

/// Result type alias for store calls.
pub type StoreResult<T> = Result<T, StorageError>;

// ============================================================================
// LEDGER STORE TRAIT
// ============================================================================

/// Whole-grid string operations against a tabular spreadsheet service.
///
/// Rows and columns are 1-based. Every value is text; a blank cell is `""`.
/// Calls are independent: there is no transaction, lock or version check
/// spanning two calls.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // === Worksheets ===

    /// Titles of all worksheets, in spreadsheet order.
    async fn worksheet_titles(&self) -> StoreResult<Vec<String>>;

    /// Create a worksheet with an initial grid size.
    async fn create_worksheet(&self, title: &str, rows: usize, cols: usize) -> StoreResult<()>;

    // === Reads ===

    /// Every row of the used range. Rows are ragged: trailing blanks dropped.
    async fn all_values(&self, sheet: &str) -> StoreResult<Vec<Vec<String>>>;

    /// One row, trailing blanks dropped.
    async fn row_values(&self, sheet: &str, row: usize) -> StoreResult<Vec<String>>;

    /// One column from row 1 down, trailing blanks dropped.
    async fn col_values(&self, sheet: &str, col: usize) -> StoreResult<Vec<String>>;

    /// A single cell, `""` when blank or outside the used range.
    async fn cell(&self, sheet: &str, row: usize, col: usize) -> StoreResult<String>;

    // === Writes ===

    /// Overwrite a single cell.
    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str)
        -> StoreResult<()>;

    /// Append rows after the last non-blank row of the sheet.
    async fn append_rows(&self, sheet: &str, rows: Vec<Vec<String>>) -> StoreResult<()>;

    /// Insert a row so that it becomes row `index`, shifting later rows down.
    async fn insert_row(&self, sheet: &str, values: Vec<String>, index: usize) -> StoreResult<()>;

    /// Widen the grid by `count` columns.
    async fn add_cols(&self, sheet: &str, count: usize) -> StoreResult<()>;

    /// Remove every value from the sheet.
    async fn clear(&self, sheet: &str) -> StoreResult<()>;

    // === Provided ===

    /// Append one row after the last non-blank row.
    async fn append_row(&self, sheet: &str, values: Vec<String>) -> StoreResult<()> {
        self.append_rows(sheet, vec![values]).await
    }

    /// Read the whole sheet into a snapshot.
    async fn snapshot(&self, sheet: &str) -> StoreResult<SheetSnapshot> {
        let rows = self.all_values(sheet).await?;
        Ok(SheetSnapshot::new(sheet, rows))
    }

    async fn has_worksheet(&self, sheet: &str) -> StoreResult<bool> {
        Ok(self.worksheet_titles().await?.iter().any(|t| t == sheet))
    }
}
