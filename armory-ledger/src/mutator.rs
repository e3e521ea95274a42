//! Ledger Mutator
//!
//! Insert, remove and move serials in stock worksheets. A stock column is a
//! sparse multiset: removal blanks a cell (a tombstone) and insertion reuses
//! the first tombstone before growing the sheet.

use crate::locator::{find_serial_in, RecordLocator, SerialLocation};
use crate::schema::SchemaRegistry;
use armory_core::{pad_row, LedgerLayout, LedgerResult, SheetSnapshot};
use armory_storage::LedgerStore;
use serde::Serialize;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InsertOutcome {
    Added {
        row: usize,
        col: usize,
        column_created: bool,
    },
    /// The serial is already present in a column that requires unique values.
    DuplicateRejected { row: usize },
}

impl InsertOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, InsertOutcome::Added { .. })
    }
}

/// Result of taking a new serial into stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    Stocked { insert: InsertOutcome },
    /// The serial is already recorded elsewhere in the ledger.
    HeldElsewhere { location: SerialLocation },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemoveOutcome {
    Removed { row: usize },
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveRejection {
    /// The type is not a header of the source worksheet.
    UnknownType,
    SerialNotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MoveOutcome {
    Moved {
        source_row: usize,
        destination: InsertOutcome,
    },
    Rejected { reason: MoveRejection },
}

/// Writes a record row at the snapshot's append index: inserted before the
/// summary row when there is one, appended otherwise.
pub(crate) async fn write_record_row(
    store: &dyn LedgerStore,
    snapshot: &SheetSnapshot,
    values: Vec<String>,
) -> LedgerResult<usize> {
    let row = snapshot.append_index();
    if snapshot.has_summary_row() {
        store.insert_row(&snapshot.title, values, row).await?;
    } else {
        store.append_row(&snapshot.title, values).await?;
    }
    Ok(row)
}

pub struct LedgerMutator<'a> {
    store: &'a dyn LedgerStore,
    layout: &'a LedgerLayout,
}

impl<'a> LedgerMutator<'a> {
    pub fn new(store: &'a dyn LedgerStore, layout: &'a LedgerLayout) -> Self {
        Self { store, layout }
    }

    /// Place `serial` in the first free slot of `type_name`'s column,
    /// creating the column when the type is new.
    pub async fn insert_into_stock(
        &self,
        sheet: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<InsertOutcome> {
        let snapshot = self.store.snapshot(sheet).await?;

        let Some(col) = snapshot.column_of(type_name) else {
            return self.insert_into_new_column(&snapshot, type_name, serial).await;
        };

        if !self.layout.is_counted(type_name) {
            if let Some(row) = find_serial_in(&snapshot, type_name, serial) {
                info!(sheet = %sheet, type_name = %type_name, serial = %serial, row, "Duplicate serial rejected");
                return Ok(InsertOutcome::DuplicateRejected { row });
            }
        }

        let tombstone = snapshot
            .column_cells(col)
            .find(|(_, value)| value.is_empty())
            .map(|(row, _)| row);

        let row = match tombstone {
            Some(row) => {
                self.store.update_cell(sheet, row, col, serial).await?;
                row
            }
            None => {
                let width = snapshot.headers().len().max(col);
                let mut values = vec![String::new(); width];
                values[col - 1] = serial.to_string();
                write_record_row(self.store, &snapshot, values).await?
            }
        };

        debug!(sheet = %sheet, type_name = %type_name, serial = %serial, row, col, "Inserted serial");
        Ok(InsertOutcome::Added {
            row,
            col,
            column_created: false,
        })
    }

    async fn insert_into_new_column(
        &self,
        snapshot: &SheetSnapshot,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<InsertOutcome> {
        let sheet = snapshot.title.as_str();
        let column = SchemaRegistry::new(self.store, self.layout)
            .ensure_column(sheet, type_name)
            .await?;
        let col = column.index;

        // Row 2 may be the summary row of an otherwise empty sheet.
        if snapshot.has_summary_row() && snapshot.last_data_row() < 2 {
            let mut values = pad_row(Vec::new(), col);
            values[col - 1] = serial.to_string();
            self.store.insert_row(sheet, values, 2).await?;
        } else {
            self.store.update_cell(sheet, 2, col, serial).await?;
        }

        debug!(sheet = %sheet, type_name = %type_name, serial = %serial, col, "Inserted serial into new column");
        Ok(InsertOutcome::Added {
            row: 2,
            col,
            column_created: true,
        })
    }

    /// Take a serial that is new to the ledger into stock.
    ///
    /// Uncounted types are rejected when the serial is already held anywhere:
    /// any stock or repair column, or issued to a person.
    pub async fn add_to_stock(
        &self,
        sheet: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<AddOutcome> {
        if !self.layout.is_counted(type_name) {
            if let Some(location) = RecordLocator::new(self.store)
                .locate_serial(self.layout, serial)
                .await?
            {
                info!(
                    serial = %serial,
                    held_in = %location.sheet,
                    column = %location.column,
                    row = location.row,
                    "New serial rejected: already held"
                );
                return Ok(AddOutcome::HeldElsewhere { location });
            }
        }
        let insert = self.insert_into_stock(sheet, type_name, serial).await?;
        Ok(AddOutcome::Stocked { insert })
    }

    /// Blank the cell holding `serial`; the rest of the row is untouched.
    pub async fn remove_from_stock(
        &self,
        sheet: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<RemoveOutcome> {
        let snapshot = self.store.snapshot(sheet).await?;
        let (Some(col), Some(row)) = (
            snapshot.column_of(type_name),
            find_serial_in(&snapshot, type_name, serial),
        ) else {
            info!(sheet = %sheet, type_name = %type_name, serial = %serial, "Serial not found for removal");
            return Ok(RemoveOutcome::NotFound);
        };

        self.store.update_cell(sheet, row, col, "").await?;
        debug!(sheet = %sheet, type_name = %type_name, serial = %serial, row, "Removed serial");
        Ok(RemoveOutcome::Removed { row })
    }

    /// Blank `serial` in `source`, then insert it into `destination`.
    ///
    /// Nothing is rolled back: if the destination write fails the source
    /// cell stays blank and the serial is absent from both worksheets.
    pub async fn move_serial(
        &self,
        source: &str,
        destination: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<MoveOutcome> {
        let snapshot = self.store.snapshot(source).await?;
        let Some(col) = snapshot.column_of(type_name) else {
            info!(source = %source, type_name = %type_name, "Move rejected: unknown type");
            return Ok(MoveOutcome::Rejected {
                reason: MoveRejection::UnknownType,
            });
        };
        let Some(source_row) = find_serial_in(&snapshot, type_name, serial) else {
            info!(source = %source, type_name = %type_name, serial = %serial, "Move rejected: serial not found");
            return Ok(MoveOutcome::Rejected {
                reason: MoveRejection::SerialNotFound,
            });
        };

        self.store.update_cell(source, source_row, col, "").await?;

        let inserted = self
            .insert_into_stock(destination, type_name, serial)
            .await
            .inspect_err(|e| {
                error!(
                    source = %source,
                    destination = %destination,
                    type_name = %type_name,
                    serial = %serial,
                    error = %e,
                    "Move half-applied: source blanked, destination write failed"
                );
            })?;

        debug!(source = %source, destination = %destination, serial = %serial, "Moved serial");
        Ok(MoveOutcome::Moved {
            source_row,
            destination: inserted,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{StorageError, SUMMARY_ROW_LABEL};
    use armory_storage::InMemoryLedger;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn column(store: &InMemoryLedger, sheet: &str, type_name: &str) -> Vec<String> {
        let snap = store.snapshot_of(sheet).unwrap();
        let col = snap.column_of(type_name).unwrap();
        snap.column_cells(col)
            .filter(|(_, v)| !v.is_empty())
            .map(|(_, v)| v.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_insert_reuses_first_tombstone() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet(
            "stock",
            rows(&[&["M4", "M16"], &["1", "a"], &["", "b"], &["", "c"]]),
        );
        let outcome = LedgerMutator::new(&store, &layout)
            .insert_into_stock("stock", "M4", "2")
            .await
            .unwrap();
        assert_eq!(
            outcome,
            InsertOutcome::Added { row: 3, col: 1, column_created: false }
        );
        assert_eq!(store.snapshot_of("stock").unwrap().row_count(), 4);
    }

    #[tokio::test]
    async fn test_insert_appends_full_width_row_when_no_tombstone() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4", "M16", "AK"], &["1", "a", "x"]]));
        let outcome = LedgerMutator::new(&store, &layout)
            .insert_into_stock("stock", "M16", "b")
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Added { row: 3, col: 2, column_created: false });
        assert_eq!(store.row_values("stock", 3).await.unwrap(), vec!["", "b"]);
    }

    #[tokio::test]
    async fn test_insert_lands_before_summary_row() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet(
            "stock",
            rows(&[&["M4"], &["1"], &[SUMMARY_ROW_LABEL, "1"]]),
        );
        LedgerMutator::new(&store, &layout)
            .insert_into_stock("stock", "M4", "2")
            .await
            .unwrap();
        let snap = store.snapshot_of("stock").unwrap();
        assert_eq!(snap.cell(3, 1), "2");
        assert_eq!(snap.cell(4, 1), SUMMARY_ROW_LABEL);
    }

    #[tokio::test]
    async fn test_insert_creates_column() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4"], &["1"], &["2"]]));
        let outcome = LedgerMutator::new(&store, &layout)
            .insert_into_stock("stock", "Tavor", "T1")
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Added { row: 2, col: 2, column_created: true });
        assert_eq!(column(&store, "stock", "Tavor"), vec!["T1"]);
    }

    #[tokio::test]
    async fn test_insert_into_new_column_keeps_summary_row() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4"], &[SUMMARY_ROW_LABEL]]));
        LedgerMutator::new(&store, &layout)
            .insert_into_stock("stock", "Tavor", "T1")
            .await
            .unwrap();
        let snap = store.snapshot_of("stock").unwrap();
        assert_eq!(snap.cell(2, 2), "T1");
        assert!(snap.has_summary_row());
    }

    #[tokio::test]
    async fn test_duplicate_rejected_without_mutation() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4"], &["S1"]]));
        let mutator = LedgerMutator::new(&store, &layout);
        let outcome = mutator.insert_into_stock("stock", "M4", "S1").await.unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicateRejected { row: 2 });
        assert_eq!(store.write_count(), 0);
        assert_eq!(column(&store, "stock", "M4"), vec!["S1"]);
    }

    #[tokio::test]
    async fn test_counted_type_accepts_repeats() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("optics", rows(&[&["M5"], &["1"]]));
        let outcome = LedgerMutator::new(&store, &layout)
            .insert_into_stock("optics", "M5", "1")
            .await
            .unwrap();
        assert!(outcome.is_added());
        assert_eq!(column(&store, "optics", "M5"), vec!["1", "1"]);
    }

    #[tokio::test]
    async fn test_remove_blanks_single_cell() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4", "M16"], &["1", "a"]]));
        let mutator = LedgerMutator::new(&store, &layout);
        assert_eq!(
            mutator.remove_from_stock("stock", "M4", "1").await.unwrap(),
            RemoveOutcome::Removed { row: 2 }
        );
        assert_eq!(store.row_values("stock", 2).await.unwrap(), vec!["", "a"]);
        assert_eq!(
            mutator.remove_from_stock("stock", "M4", "1").await.unwrap(),
            RemoveOutcome::NotFound
        );
        assert_eq!(
            mutator.remove_from_stock("stock", "Tavor", "1").await.unwrap(),
            RemoveOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_move_between_sheets() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new()
            .with_sheet("A", rows(&[&["Scope"], &["S9"]]))
            .with_sheet("B", rows(&[&["Other"]]));
        let outcome = LedgerMutator::new(&store, &layout)
            .move_serial("A", "B", "Scope", "S9")
            .await
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Moved { source_row: 2, destination } if destination.is_added()));
        assert!(column(&store, "A", "Scope").is_empty());
        assert_eq!(column(&store, "B", "Scope"), vec!["S9"]);
    }

    #[tokio::test]
    async fn test_move_rejections() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new()
            .with_sheet("A", rows(&[&["Scope"], &["S9"]]))
            .with_sheet("B", rows(&[&["Scope"]]));
        let mutator = LedgerMutator::new(&store, &layout);
        assert_eq!(
            mutator.move_serial("A", "B", "Laser", "S9").await.unwrap(),
            MoveOutcome::Rejected { reason: MoveRejection::UnknownType }
        );
        assert_eq!(
            mutator.move_serial("A", "B", "Scope", "S1").await.unwrap(),
            MoveOutcome::Rejected { reason: MoveRejection::SerialNotFound }
        );
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_move_destination_failure_leaves_serial_nowhere() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new()
            .with_sheet("A", rows(&[&["Scope"], &["S9"]]))
            .with_sheet("B", rows(&[&["Scope"], &["S1"]]));
        store.fail_writes("B");

        let err = LedgerMutator::new(&store, &layout)
            .move_serial("A", "B", "Scope", "S9")
            .await
            .unwrap_err();
        assert!(err.is_store_unavailable());
        assert!(matches!(
            err,
            armory_core::LedgerError::Storage(StorageError::StoreUnavailable { .. })
        ));
        assert!(column(&store, "A", "Scope").is_empty());
        assert_eq!(column(&store, "B", "Scope"), vec!["S1"]);
    }

    #[tokio::test]
    async fn test_add_to_stock_rejects_serial_held_anywhere() {
        use armory_test_utils::fixtures::{seeded_ledger, small_layout};

        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let mutator = LedgerMutator::new(&store, &layout);

        // Issued to a person
        let outcome = mutator.add_to_stock(&layout.weapon_stock, "M4", "W1").await.unwrap();
        assert!(matches!(outcome, AddOutcome::HeldElsewhere { ref location } if location.sheet == "א"));

        // Stocked under another type
        let outcome = mutator.add_to_stock(&layout.weapon_stock, "M16", "W2").await.unwrap();
        assert!(matches!(outcome, AddOutcome::HeldElsewhere { ref location } if location.column == "M4"));

        // Held in the other stock worksheet
        let outcome = mutator.add_to_stock(&layout.weapon_stock, "M4", "A1").await.unwrap();
        assert!(matches!(outcome, AddOutcome::HeldElsewhere { .. }));

        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_to_stock_counted_type_is_exempt() {
        use armory_test_utils::fixtures::{seeded_ledger, small_layout};

        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let outcome = LedgerMutator::new(&store, &layout)
            .add_to_stock(&layout.intention_stock, "M5", &layout.counted_unit_serial)
            .await
            .unwrap();
        assert!(matches!(outcome, AddOutcome::Stocked { insert } if insert.is_added()));
    }

    #[tokio::test]
    async fn test_add_to_stock_accepts_new_serial() {
        use armory_test_utils::fixtures::{seeded_ledger, small_layout};

        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let outcome = LedgerMutator::new(&store, &layout)
            .add_to_stock(&layout.repair_stock, "M4", "W77")
            .await
            .unwrap();
        assert!(matches!(outcome, AddOutcome::Stocked { insert } if insert.is_added()));
    }
}
