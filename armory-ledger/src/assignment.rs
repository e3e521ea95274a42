//! Person Assignment Manager
//!
//! Group worksheets hold one row per person. A person carries at most one
//! serial per intention-type column; the fixed columns hold the issued weapon.
//! None of these operations touch stock on their own except `return_all`;
//! callers sequence stock removal before assignment.

use crate::locator::find_person_in;
use crate::mutator::{write_record_row, InsertOutcome, LedgerMutator};
use crate::schema::SchemaRegistry;
use armory_core::{pad_row, LedgerError, LedgerLayout, LedgerResult, SheetSnapshot};
use armory_storage::LedgerStore;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssignOutcome {
    Assigned { row: usize, col: usize },
    AlreadyAssigned { row: usize, existing: String },
    PersonNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReturnOutcome {
    Returned { row: usize },
    /// The serial on record differs from the one being returned.
    Mismatch { row: usize, on_record: String },
    PersonNotFound,
}

/// One serial handed back to stock by `return_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnedItem {
    pub type_name: String,
    pub serial: String,
    pub stock_sheet: String,
    pub outcome: InsertOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReturnAllOutcome {
    Returned { row: usize, items: Vec<ReturnedItem> },
    PersonNotFound,
}

/// State of one (person, type) slot, read without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    PersonNotFound,
    /// The person exists and the slot is empty or the column does not exist yet.
    Free { row: usize },
    Occupied { row: usize, existing: String },
}

/// Fields of a new person row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment<'s> {
    pub full_name: &'s str,
    pub weapon_type: &'s str,
    pub weapon_serial: &'s str,
    pub intention_type: Option<&'s str>,
}

fn cell_by_header<'s>(snapshot: &'s SheetSnapshot, row: usize, name: &str) -> &'s str {
    snapshot
        .column_of(name)
        .map(|col| snapshot.cell(row, col).trim())
        .unwrap_or("")
}

pub struct AssignmentManager<'a> {
    store: &'a dyn LedgerStore,
    layout: &'a LedgerLayout,
}

impl<'a> AssignmentManager<'a> {
    pub fn new(store: &'a dyn LedgerStore, layout: &'a LedgerLayout) -> Self {
        Self { store, layout }
    }

    fn name_column(&self) -> &str {
        &self.layout.group_columns.full_name
    }

    pub async fn find_person(&self, group: &str, full_name: &str) -> LedgerResult<Option<usize>> {
        let snapshot = self.store.snapshot(group).await?;
        find_person_in(&snapshot, self.name_column(), full_name)
    }

    pub async fn slot_state(
        &self,
        group: &str,
        full_name: &str,
        type_name: &str,
    ) -> LedgerResult<SlotState> {
        let snapshot = self.store.snapshot(group).await?;
        let Some(row) = find_person_in(&snapshot, self.name_column(), full_name)? else {
            return Ok(SlotState::PersonNotFound);
        };
        let existing = snapshot
            .column_of(type_name)
            .map(|col| snapshot.cell(row, col))
            .unwrap_or("");
        if existing.is_empty() {
            Ok(SlotState::Free { row })
        } else {
            Ok(SlotState::Occupied {
                row,
                existing: existing.to_string(),
            })
        }
    }

    /// Write `serial` into the person's `type_name` cell when it is empty.
    pub async fn assign(
        &self,
        group: &str,
        full_name: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<AssignOutcome> {
        let col = SchemaRegistry::new(self.store, self.layout)
            .ensure_column(group, type_name)
            .await?
            .index;
        let snapshot = self.store.snapshot(group).await?;
        let Some(row) = find_person_in(&snapshot, self.name_column(), full_name)? else {
            info!(group = %group, full_name = %full_name, "Assignment rejected: person not found");
            return Ok(AssignOutcome::PersonNotFound);
        };

        let existing = snapshot.cell(row, col);
        if !existing.is_empty() {
            info!(group = %group, full_name = %full_name, type_name = %type_name, existing = %existing, "Assignment rejected: slot occupied");
            return Ok(AssignOutcome::AlreadyAssigned {
                row,
                existing: existing.to_string(),
            });
        }

        self.store.update_cell(group, row, col, serial).await?;
        debug!(group = %group, full_name = %full_name, type_name = %type_name, serial = %serial, "Assigned serial");
        Ok(AssignOutcome::Assigned { row, col })
    }

    /// Blank the person's `type_name` cell if it holds exactly `serial`.
    pub async fn return_assignment(
        &self,
        group: &str,
        full_name: &str,
        type_name: &str,
        serial: &str,
    ) -> LedgerResult<ReturnOutcome> {
        let snapshot = self.store.snapshot(group).await?;
        let col = snapshot
            .column_of(type_name)
            .ok_or_else(|| LedgerError::ColumnNotFound {
                worksheet: group.to_string(),
                column: type_name.to_string(),
            })?;
        let Some(row) = find_person_in(&snapshot, self.name_column(), full_name)? else {
            info!(group = %group, full_name = %full_name, "Return rejected: person not found");
            return Ok(ReturnOutcome::PersonNotFound);
        };

        let on_record = snapshot.cell(row, col);
        if on_record != serial {
            info!(group = %group, full_name = %full_name, type_name = %type_name, on_record = %on_record, serial = %serial, "Return rejected: serial mismatch");
            return Ok(ReturnOutcome::Mismatch {
                row,
                on_record: on_record.to_string(),
            });
        }

        self.store.update_cell(group, row, col, "").await?;
        debug!(group = %group, full_name = %full_name, type_name = %type_name, serial = %serial, "Returned serial");
        Ok(ReturnOutcome::Returned { row })
    }

    /// Add a person row issued with a weapon, before the summary row.
    ///
    /// The ordinal continues from the last record's first cell when that is
    /// a number, and starts at 1 otherwise.
    pub async fn enroll(&self, group: &str, enrollment: &Enrollment<'_>) -> LedgerResult<usize> {
        let snapshot = self.store.snapshot(group).await?;
        let last = snapshot.last_data_row();
        let ordinal = if last >= 2 {
            snapshot
                .cell(last, 1)
                .trim()
                .parse::<u64>()
                .map(|n| n + 1)
                .unwrap_or(1)
        } else {
            1
        };

        let values = vec![
            ordinal.to_string(),
            enrollment.weapon_type.to_string(),
            String::new(),
            enrollment.intention_type.unwrap_or("").to_string(),
            enrollment.weapon_serial.to_string(),
            enrollment.full_name.trim().to_string(),
        ];
        let row = write_record_row(self.store, &snapshot, values).await?;
        debug!(group = %group, full_name = %enrollment.full_name, row, ordinal, "Enrolled person");
        Ok(row)
    }

    /// Hand everything a person holds back to stock, then drop their row.
    ///
    /// The weapon goes to weapon stock; the fixed intention column returns
    /// one counted unit of its type; every other intention column returns
    /// its serial to intention stock. The row is removed by rewriting the
    /// whole worksheet (clear, then re-append the header and every other row
    /// in order) because the store has no row-delete primitive.
    pub async fn return_all(&self, group: &str, full_name: &str) -> LedgerResult<ReturnAllOutcome> {
        let snapshot = self.store.snapshot(group).await?;
        let Some(row) = find_person_in(&snapshot, self.name_column(), full_name)? else {
            info!(group = %group, full_name = %full_name, "Return-all rejected: person not found");
            return Ok(ReturnAllOutcome::PersonNotFound);
        };

        let columns = &self.layout.group_columns;
        let cell_of = |name: &str| cell_by_header(&snapshot, row, name).to_string();

        // (stock sheet, type, serial)
        let mut pending: Vec<(&str, String, String)> = Vec::new();

        let weapon_type = cell_of(&columns.weapon_type);
        let weapon_serial = cell_of(&columns.weapon_serial);
        if !weapon_serial.is_empty() {
            if weapon_type.is_empty() {
                warn!(group = %group, full_name = %full_name, serial = %weapon_serial, "Weapon serial without a type, not returned to stock");
            } else {
                pending.push((
                    self.layout.weapon_stock.as_str(),
                    weapon_type.clone(),
                    weapon_serial.clone(),
                ));
            }
        }

        let fixed_intention = cell_of(&columns.intention_type);
        if !fixed_intention.is_empty() {
            pending.push((
                self.layout.intention_stock.as_str(),
                fixed_intention,
                self.layout.counted_unit_serial.clone(),
            ));
        }

        let fixed = columns.header_row();
        for (index, header) in snapshot.headers().iter().enumerate() {
            let name = header.trim();
            if name.is_empty() || fixed.iter().any(|f| f == name) {
                continue;
            }
            let value = snapshot.cell(row, index + 1).trim();
            if !value.is_empty() {
                pending.push((
                    self.layout.intention_stock.as_str(),
                    name.to_string(),
                    value.to_string(),
                ));
            }
        }

        let mutator = LedgerMutator::new(self.store, self.layout);
        let mut items = Vec::with_capacity(pending.len());
        for (stock_sheet, type_name, serial) in pending {
            let outcome = mutator
                .insert_into_stock(stock_sheet, &type_name, &serial)
                .await?;
            items.push(ReturnedItem {
                type_name,
                serial,
                stock_sheet: stock_sheet.to_string(),
                outcome,
            });
        }

        self.rewrite_without_row(group, &snapshot.rows, row).await?;
        debug!(group = %group, full_name = %full_name, returned = items.len(), "Returned all items and removed person row");
        Ok(ReturnAllOutcome::Returned { row, items })
    }

    /// Whole-sheet rewrite omitting one 1-based row. Relative order of every
    /// other row, the summary row included, is preserved.
    async fn rewrite_without_row(
        &self,
        sheet: &str,
        rows: &[Vec<String>],
        skip: usize,
    ) -> LedgerResult<()> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let remaining: Vec<Vec<String>> = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| i + 1 != skip)
            .map(|(_, r)| pad_row(r.clone(), width))
            .collect();
        self.store.clear(sheet).await?;
        self.store.append_rows(sheet, remaining).await?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
