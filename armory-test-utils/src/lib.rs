//! Armory Test Utilities
//!
//! Shared test infrastructure for the armory workspace:
//! - Fixtures: seeded in-memory ledgers laid out like the deployed spreadsheet
//! - Proptest generators for serials, type names and operation sequences
//! - Assertions over where serials live in a ledger

pub use armory_core::{LedgerError, LedgerLayout, LedgerResult, SheetSnapshot, StorageError};
pub use armory_storage::{InMemoryLedger, LedgerStore};

/// Build owned rows from string literals.
pub fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use super::*;
    use armory_core::SUMMARY_ROW_LABEL;

    /// Intention types present as columns in the seeded ledgers.
    pub const OPTICS: [&str; 2] = ["ACOG", "EOTech"];

    /// Default layout trimmed to two groups, which keeps fixtures small.
    pub fn small_layout() -> LedgerLayout {
        LedgerLayout {
            groups: vec!["א".to_string(), "ב".to_string()],
            ..LedgerLayout::default()
        }
    }

    pub fn group_header(layout: &LedgerLayout) -> Vec<String> {
        let mut header = layout.group_columns.header_row();
        header.extend(OPTICS.iter().map(|s| s.to_string()));
        header
    }

    fn intention_stock_header(layout: &LedgerLayout) -> Vec<String> {
        let mut header = layout.counted_intentions.clone();
        header.extend(OPTICS.iter().map(|s| s.to_string()));
        header
    }

    /// Every configured worksheet with headers and no records.
    pub fn empty_ledger(layout: &LedgerLayout) -> InMemoryLedger {
        let store = InMemoryLedger::new();
        for group in &layout.groups {
            store.seed(group, vec![group_header(layout)]);
        }
        store.seed(&layout.weapon_stock, rows(&[&["M4", "M16"]]));
        store.seed(&layout.intention_stock, vec![intention_stock_header(layout)]);
        store.seed(&layout.repair_stock, rows(&[&["M4"]]));
        store.seed(&layout.audit_sheet, Vec::new());
        store.seed(&layout.summary_sheet, Vec::new());
        store
    }

    /// A ledger with stock, one issued person and a summary row.
    ///
    /// - weapon stock: M4 `W2`, `W3`; M16 `W10`
    /// - intention stock: two counted units each of M5 and מאפרו, ACOG `A1`, EOTech `E1`
    /// - first group: Dana (M4 `W1`, one M5, ACOG `A7`), Noa (M16 `W11`), summary row
    pub fn seeded_ledger(layout: &LedgerLayout) -> InMemoryLedger {
        let store = empty_ledger(layout);
        let unit = layout.counted_unit_serial.as_str();

        store.seed(
            &layout.weapon_stock,
            rows(&[&["M4", "M16"], &["W2", "W10"], &["W3", ""]]),
        );
        let mut optics = vec![intention_stock_header(layout)];
        optics.push(
            [unit, unit, "A1", "E1"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        optics.push([unit, unit].iter().map(|s| s.to_string()).collect());
        store.seed(&layout.intention_stock, optics);

        if let Some(first) = layout.groups.first() {
            let mut sheet = vec![group_header(layout)];
            sheet.extend(rows(&[
                &["1", "M4", "", "M5", "W1", "Dana", "", "A7", ""],
                &["2", "M16", "", "", "W11", "Noa"],
                &[SUMMARY_ROW_LABEL],
            ]));
            store.seed(first, sheet);
        }
        store
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use proptest::prelude::*;

    pub fn arb_serial() -> impl Strategy<Value = String> {
        "[A-Z][0-9]{1,3}"
    }

    /// Weapon types; kept to a few so collisions happen.
    pub fn arb_weapon_type() -> impl Strategy<Value = String> {
        prop_oneof![Just("M4"), Just("M16"), Just("Tavor"), Just("Negev")].prop_map(String::from)
    }

    pub fn arb_optic_type() -> impl Strategy<Value = String> {
        prop_oneof![Just("ACOG"), Just("EOTech"), Just("Trijicon")].prop_map(String::from)
    }

    /// One step of a random ledger session.
    #[derive(Debug, Clone)]
    pub enum LedgerOp {
        AddWeapon { type_name: String, serial: String },
        AddOptic { type_name: String, serial: String },
        SendToRepair { type_name: String, serial: String },
        ReceiveFromRepair { type_name: String, serial: String },
        AssignOptic { person: usize, type_name: String, serial: String },
        ReturnOptic { person: usize, type_name: String, serial: String },
        ReturnAll { person: usize },
    }

    pub fn arb_ledger_op(people: usize) -> impl Strategy<Value = LedgerOp> {
        let people = people.max(1);
        prop_oneof![
            (arb_weapon_type(), arb_serial())
                .prop_map(|(type_name, serial)| LedgerOp::AddWeapon { type_name, serial }),
            (arb_optic_type(), arb_serial())
                .prop_map(|(type_name, serial)| LedgerOp::AddOptic { type_name, serial }),
            (arb_weapon_type(), arb_serial())
                .prop_map(|(type_name, serial)| LedgerOp::SendToRepair { type_name, serial }),
            (arb_weapon_type(), arb_serial())
                .prop_map(|(type_name, serial)| LedgerOp::ReceiveFromRepair { type_name, serial }),
            (0..people, arb_optic_type(), arb_serial()).prop_map(|(person, type_name, serial)| {
                LedgerOp::AssignOptic { person, type_name, serial }
            }),
            (0..people, arb_optic_type(), arb_serial()).prop_map(|(person, type_name, serial)| {
                LedgerOp::ReturnOptic { person, type_name, serial }
            }),
            (0..people).prop_map(|person| LedgerOp::ReturnAll { person }),
        ]
    }

    pub fn arb_ledger_ops(people: usize, max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
        prop::collection::vec(arb_ledger_op(people), 1..max_len.max(2))
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    use super::*;

    /// A place a serial was found: `(worksheet, column header, row)`.
    pub type Location = (String, String, usize);

    /// Every record cell holding `serial`, across the given worksheets.
    ///
    /// Group worksheets only count their weapon-serial column and their
    /// intention columns; the other fixed columns hold names and types.
    pub fn serial_locations(
        store: &InMemoryLedger,
        layout: &LedgerLayout,
        serial: &str,
    ) -> Vec<Location> {
        let mut found = Vec::new();
        let fixed = layout.group_columns.header_row();
        for sheet in layout.all_sheets() {
            let Some(snap) = store.snapshot_of(&sheet) else {
                continue;
            };
            let is_group = layout.is_group(&sheet);
            for (i, header) in snap.headers().iter().enumerate() {
                let skip = is_group
                    && *header != layout.group_columns.weapon_serial
                    && fixed.iter().any(|f| f == header);
                if skip || sheet == layout.audit_sheet || sheet == layout.summary_sheet {
                    continue;
                }
                for (row, value) in snap.column_cells(i + 1) {
                    if value == serial {
                        found.push((sheet.clone(), header.clone(), row));
                    }
                }
            }
        }
        found
    }

    #[track_caller]
    pub fn assert_at_most_one_location(store: &InMemoryLedger, layout: &LedgerLayout, serial: &str) {
        let found = serial_locations(store, layout, serial);
        assert!(found.len() <= 1, "serial {} found in {} places: {:?}", serial, found.len(), found);
    }

    #[track_caller]
    pub fn assert_store_unavailable<T: std::fmt::Debug>(result: &LedgerResult<T>) {
        match result {
            Err(LedgerError::Storage(StorageError::StoreUnavailable { .. })) => {}
            other => panic!("Expected StoreUnavailable, got: {:?}", other),
        }
    }

    /// Non-empty values of one column, top to bottom, summary row excluded.
    pub fn column_values(store: &InMemoryLedger, sheet: &str, type_name: &str) -> Vec<String> {
        let Some(snap) = store.snapshot_of(sheet) else {
            return Vec::new();
        };
        let Some(col) = snap.column_of(type_name) else {
            return Vec::new();
        };
        snap.column_cells(col)
            .filter(|(_, v)| !v.is_empty())
            .map(|(_, v)| v.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_seeded_ledger_is_consistent() {
        let layout = small_layout();
        let store = seeded_ledger(&layout);
        for serial in ["W1", "W2", "W3", "W10", "W11", "A1", "A7", "E1"] {
            assert_eq!(serial_locations(&store, &layout, serial).len(), 1, "{}", serial);
        }
        assert_eq!(column_values(&store, &layout.intention_stock, "M5"), vec!["1", "1"]);
    }

    #[test]
    fn test_empty_ledger_has_every_sheet() {
        let layout = small_layout();
        let store = empty_ledger(&layout);
        for sheet in layout.all_sheets() {
            assert!(store.snapshot_of(&sheet).is_some(), "{}", sheet);
        }
    }
}
