//! Record Locator
//!
//! Lookups over a single worksheet read. The summary row is never a match.

use armory_core::{LedgerError, LedgerLayout, LedgerResult, SheetSnapshot, StorageError};
use armory_storage::LedgerStore;
use serde::Serialize;
use tracing::warn;

/// Where a serial was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerialLocation {
    pub sheet: String,
    /// Column header, i.e. the item type for stock worksheets
    pub column: String,
    pub row: usize,
}

/// First record row holding exactly `serial` under `type_name`. An absent
/// column and an absent value both yield `None`.
pub fn find_serial_in(snapshot: &SheetSnapshot, type_name: &str, serial: &str) -> Option<usize> {
    let col = snapshot.column_of(type_name)?;
    snapshot
        .column_cells(col)
        .find(|(_, value)| *value == serial)
        .map(|(row, _)| row)
}

/// First record row whose `name_column` cell equals `full_name` after trimming.
pub fn find_person_in(
    snapshot: &SheetSnapshot,
    name_column: &str,
    full_name: &str,
) -> LedgerResult<Option<usize>> {
    let col = snapshot
        .column_of(name_column)
        .ok_or_else(|| LedgerError::MissingNameColumn {
            worksheet: snapshot.title.clone(),
            column: name_column.to_string(),
        })?;
    let wanted = full_name.trim();
    Ok(snapshot
        .column_cells(col)
        .find(|(_, value)| value.trim() == wanted)
        .map(|(row, _)| row))
}

pub struct RecordLocator<'a> {
    store: &'a dyn LedgerStore,
}

impl<'a> RecordLocator<'a> {
    pub fn new(store: &'a dyn LedgerStore) -> Self {
        Self { store }
    }

    pub async fn find_serial(
        &self,
        sheet: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<Option<usize>> {
        let snapshot = self.store.snapshot(sheet).await?;
        Ok(find_serial_in(&snapshot, type_name, serial))
    }

    /// First record cell holding `serial` anywhere a unique serial can live:
    /// every uncounted column of the stock and repair worksheets, and the
    /// weapon-serial and intention columns of each group worksheet. Missing
    /// worksheets are skipped.
    pub async fn locate_serial(
        &self,
        layout: &LedgerLayout,
        serial: &str,
    ) -> LedgerResult<Option<SerialLocation>> {
        let stocks = [
            layout.weapon_stock.as_str(),
            layout.intention_stock.as_str(),
            layout.repair_stock.as_str(),
        ];
        let fixed = layout.group_columns.header_row();

        for sheet in stocks.into_iter().chain(layout.groups.iter().map(String::as_str)) {
            let snapshot = match self.store.snapshot(sheet).await {
                Ok(snapshot) => snapshot,
                Err(StorageError::WorksheetNotFound { .. }) => {
                    warn!(sheet = %sheet, "Worksheet missing, skipped in serial lookup");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let is_group = layout.is_group(sheet);

            for (index, header) in snapshot.headers().iter().enumerate() {
                let name = header.trim();
                if name.is_empty() || layout.is_counted(name) {
                    continue;
                }
                if is_group && name != layout.group_columns.weapon_serial && fixed.iter().any(|f| f == name) {
                    continue;
                }
                let found = snapshot
                    .column_cells(index + 1)
                    .find(|(_, value)| *value == serial)
                    .map(|(row, _)| row);
                if let Some(row) = found {
                    return Ok(Some(SerialLocation {
                        sheet: sheet.to_string(),
                        column: name.to_string(),
                        row,
                    }));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::SUMMARY_ROW_LABEL;
    use armory_storage::InMemoryLedger;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_find_serial_first_match_top_down() {
        let snap = SheetSnapshot::new(
            "stock",
            rows(&[&["M4", "M16"], &["", "9"], &["7", "9"], &["7"]]),
        );
        assert_eq!(find_serial_in(&snap, "M4", "7"), Some(3));
        assert_eq!(find_serial_in(&snap, "M16", "9"), Some(2));
        assert_eq!(find_serial_in(&snap, "M4", "8"), None);
        assert_eq!(find_serial_in(&snap, "AK47", "7"), None);
    }

    #[test]
    fn test_find_serial_is_exact() {
        let snap = SheetSnapshot::new("stock", rows(&[&["M4"], &[" 7"]]));
        assert_eq!(find_serial_in(&snap, "M4", "7"), None);
    }

    #[test]
    fn test_summary_row_never_matches() {
        let snap = SheetSnapshot::new("stock", rows(&[&["M4"], &["1"], &[SUMMARY_ROW_LABEL]]));
        assert_eq!(find_serial_in(&snap, "M4", SUMMARY_ROW_LABEL), None);
    }

    #[test]
    fn test_find_person_trims() {
        let snap = SheetSnapshot::new(
            "א",
            rows(&[&["#", "שם מלא"], &["1", "  Dana Levi "], &["2", "Noa"]]),
        );
        assert_eq!(find_person_in(&snap, "שם מלא", "Dana Levi").unwrap(), Some(2));
        assert_eq!(find_person_in(&snap, "שם מלא", " Noa").unwrap(), Some(3));
        assert_eq!(find_person_in(&snap, "שם מלא", "Avi").unwrap(), None);
    }

    #[test]
    fn test_find_person_without_name_column() {
        let snap = SheetSnapshot::new("א", rows(&[&["#"]]));
        let err = find_person_in(&snap, "שם מלא", "Dana").unwrap_err();
        assert!(matches!(err, LedgerError::MissingNameColumn { .. }));
    }

    #[tokio::test]
    async fn test_locator_reads_through_store() {
        let store = InMemoryLedger::new().with_sheet("stock", rows(&[&["M4"], &["100"]]));
        let locator = RecordLocator::new(&store);
        assert_eq!(locator.find_serial("stock", "M4", "100").await.unwrap(), Some(2));
        assert!(locator.find_serial("missing", "M4", "100").await.is_err());
    }

    #[tokio::test]
    async fn test_locate_serial_across_stock_and_groups() {
        use armory_test_utils::fixtures::{seeded_ledger, small_layout};

        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let locator = RecordLocator::new(&store);

        let issued = locator.locate_serial(&layout, "W1").await.unwrap().unwrap();
        assert_eq!(issued.sheet, "א");
        assert_eq!(issued.column, layout.group_columns.weapon_serial);
        assert_eq!(issued.row, 2);

        let optic = locator.locate_serial(&layout, "A7").await.unwrap().unwrap();
        assert_eq!((optic.column.as_str(), optic.row), ("ACOG", 2));

        let stocked = locator.locate_serial(&layout, "W10").await.unwrap().unwrap();
        assert_eq!((stocked.sheet, stocked.column), (layout.weapon_stock.clone(), "M16".to_string()));

        assert_eq!(locator.locate_serial(&layout, "Z9").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_locate_serial_ignores_counted_and_name_columns() {
        use armory_test_utils::fixtures::{seeded_ledger, small_layout};

        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let locator = RecordLocator::new(&store);

        assert_eq!(locator.locate_serial(&layout, &layout.counted_unit_serial).await.unwrap(), None);
        assert_eq!(locator.locate_serial(&layout, "Dana").await.unwrap(), None);
    }
}
