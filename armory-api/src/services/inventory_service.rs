//! Inventory Service
//!
//! The operations behind the HTTP surface. Each validates its input, runs
//! read-only prechecks, then performs its writes in a fixed order: stock
//! removal before the person row changes, source before destination.
//! Prechecks narrow but do not close the window in which a failed write
//! leaves an operation half-applied; nothing is compensated afterwards.

use armory_core::{column_index, LedgerLayout};
use armory_ledger::{
    render_summary, AddOutcome, Aggregator, AssignOutcome, AssignmentManager, Enrollment,
    InsertOutcome, LedgerMutator, MoveOutcome, MoveRejection, RecordLocator, RemoveOutcome,
    ReturnAllOutcome, ReturnOutcome, SchemaRegistry, SlotState,
};
use armory_storage::LedgerStore;
use serde_json::json;

use crate::audit::AuditLog;
use crate::error::{ApiError, ApiResult};
use crate::types::{OperationReport, SummaryResponse, SummaryRowResponse, SummarySection};

/// Trimmed value of a required text field.
fn require<'v>(value: &'v str, field: &str) -> ApiResult<&'v str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ApiError::missing_field(field))
    } else {
        Ok(trimmed)
    }
}

pub struct InventoryService<'a> {
    store: &'a dyn LedgerStore,
    layout: &'a LedgerLayout,
}

impl<'a> InventoryService<'a> {
    pub fn new(store: &'a dyn LedgerStore, layout: &'a LedgerLayout) -> Self {
        Self { store, layout }
    }

    fn mutator(&self) -> LedgerMutator<'a> {
        LedgerMutator::new(self.store, self.layout)
    }

    fn assignments(&self) -> AssignmentManager<'a> {
        AssignmentManager::new(self.store, self.layout)
    }

    fn require_group<'v>(&self, group: &'v str) -> ApiResult<&'v str> {
        let group = require(group, "group")?;
        if !self.layout.is_group(group) {
            return Err(ApiError::invalid_input(format!(
                "'{}' is not a group worksheet",
                group
            )));
        }
        Ok(group)
    }

    fn stock_for(&self, is_weapon: bool) -> &'a str {
        if is_weapon {
            &self.layout.weapon_stock
        } else {
            &self.layout.intention_stock
        }
    }

    /// Audit a successful operation and hand its report back.
    async fn finish(&self, report: OperationReport) -> ApiResult<OperationReport> {
        AuditLog::new(self.store, &self.layout.audit_sheet)
            .record(&report)
            .await;
        tracing::info!(operation = %report.operation, "{}", report.message);
        Ok(report)
    }

    // ========================================================================
    // STOCK
    // ========================================================================

    pub async fn add_weapon(&self, weapon_type: &str, serial: &str) -> ApiResult<OperationReport> {
        let weapon_type = require(weapon_type, "weapon_name")?;
        let serial = require(serial, "serial_number")?;
        let sheet = self.layout.weapon_stock.as_str();

        let outcome = self.stocked(sheet, weapon_type, serial).await?;
        self.finish(OperationReport::new(
            "add_weapon",
            format!("Added {} with serial {} to {}", weapon_type, serial, sheet),
            json!({ "sheet": sheet, "result": outcome }),
        ))
        .await
    }

    /// Stock intake shared by both add endpoints. A serial already on record
    /// anywhere in the ledger is a conflict.
    async fn stocked(&self, sheet: &str, type_name: &str, serial: &str) -> ApiResult<InsertOutcome> {
        match self.mutator().add_to_stock(sheet, type_name, serial).await? {
            AddOutcome::HeldElsewhere { location } => Err(ApiError::duplicate_serial(
                &location.sheet,
                &location.column,
                serial,
            )
            .with_details(json!({ "held_in": location }))),
            AddOutcome::Stocked { insert: InsertOutcome::DuplicateRejected { .. } } => {
                Err(ApiError::duplicate_serial(sheet, type_name, serial))
            }
            AddOutcome::Stocked { insert } => Ok(insert),
        }
    }

    /// Add to intention stock, then make sure every group sheet has a column
    /// for the type.
    pub async fn add_intention(&self, intention_type: &str, serial: &str) -> ApiResult<OperationReport> {
        let intention_type = require(intention_type, "intention_type")?;
        let serial = require(serial, "serial_number")?;
        let sheet = self.layout.intention_stock.as_str();

        let outcome = self.stocked(sheet, intention_type, serial).await?;
        let sync = SchemaRegistry::new(self.store, self.layout)
            .sync_intention_columns()
            .await?;

        self.finish(OperationReport::new(
            "add_intention",
            format!("Added {} with serial {} to {}", intention_type, serial, sheet),
            json!({ "sheet": sheet, "result": outcome, "columns_added": sync.columns_added() }),
        ))
        .await
    }

    // ========================================================================
    // ASSIGNMENT
    // ========================================================================

    /// Enroll a person in a group, issuing a weapon and optionally one
    /// counted intention unit from stock.
    pub async fn assign_weapon(
        &self,
        full_name: &str,
        group: &str,
        weapon_type: &str,
        serial: &str,
        intention_type: Option<&str>,
    ) -> ApiResult<OperationReport> {
        let full_name = require(full_name, "full_name")?;
        let group = self.require_group(group)?;
        let weapon_type = require(weapon_type, "item_name")?;
        let serial = require(serial, "serial_number")?;
        let intention = intention_type.map(str::trim).filter(|t| !t.is_empty());

        let weapon_stock = self.layout.weapon_stock.as_str();
        let intention_stock = self.layout.intention_stock.as_str();
        let unit = self.layout.counted_unit_serial.as_str();
        let manager = self.assignments();
        let locator = RecordLocator::new(self.store);

        if manager.find_person(group, full_name).await?.is_some() {
            return Err(ApiError::already_enrolled(group, full_name));
        }
        if locator.find_serial(weapon_stock, weapon_type, serial).await?.is_none() {
            return Err(ApiError::serial_not_found(weapon_stock, weapon_type, serial));
        }
        if let Some(t) = intention {
            if locator.find_serial(intention_stock, t, unit).await?.is_none() {
                return Err(ApiError::serial_not_found(intention_stock, t, unit));
            }
        }

        let mutator = self.mutator();
        if let Some(t) = intention {
            if let RemoveOutcome::NotFound = mutator.remove_from_stock(intention_stock, t, unit).await? {
                return Err(ApiError::serial_not_found(intention_stock, t, unit));
            }
        }
        if let RemoveOutcome::NotFound = mutator
            .remove_from_stock(weapon_stock, weapon_type, serial)
            .await?
        {
            return Err(ApiError::serial_not_found(weapon_stock, weapon_type, serial));
        }

        let row = manager
            .enroll(
                group,
                &Enrollment {
                    full_name,
                    weapon_type,
                    weapon_serial: serial,
                    intention_type: intention,
                },
            )
            .await?;

        self.finish(OperationReport::new(
            "assign_weapon",
            format!(
                "Assigned {} with serial {} to {} in group {}",
                weapon_type, serial, full_name, group
            ),
            json!({
                "group": group,
                "row": row,
                "weapon_type": weapon_type,
                "serial_number": serial,
                "intention_type": intention,
            }),
        ))
        .await
    }

    /// Move an intention serial from stock into a person's type column.
    pub async fn assign_intention(
        &self,
        full_name: &str,
        group: &str,
        intention_type: &str,
        serial: &str,
    ) -> ApiResult<OperationReport> {
        let full_name = require(full_name, "full_name")?;
        let group = self.require_group(group)?;
        let intention_type = require(intention_type, "intention_type")?;
        let serial = require(serial, "serial_number")?;
        let stock = self.layout.intention_stock.as_str();
        let manager = self.assignments();

        match manager.slot_state(group, full_name, intention_type).await? {
            SlotState::PersonNotFound => return Err(ApiError::person_not_found(group, full_name)),
            SlotState::Occupied { existing, .. } => {
                return Err(ApiError::already_assigned(full_name, intention_type, existing))
            }
            SlotState::Free { .. } => {}
        }

        if let RemoveOutcome::NotFound = self
            .mutator()
            .remove_from_stock(stock, intention_type, serial)
            .await?
        {
            return Err(ApiError::serial_not_found(stock, intention_type, serial));
        }

        match manager.assign(group, full_name, intention_type, serial).await? {
            AssignOutcome::Assigned { row, col } => {
                self.finish(OperationReport::new(
                    "assign_intention",
                    format!(
                        "Assigned {} with serial {} to {} in group {}",
                        intention_type, serial, full_name, group
                    ),
                    json!({ "group": group, "row": row, "col": col }),
                ))
                .await
            }
            AssignOutcome::AlreadyAssigned { existing, .. } => {
                tracing::error!(group = %group, full_name = %full_name, serial = %serial, "Slot filled after precheck; serial already removed from stock");
                Err(ApiError::already_assigned(full_name, intention_type, existing))
            }
            AssignOutcome::PersonNotFound => {
                tracing::error!(group = %group, full_name = %full_name, serial = %serial, "Person vanished after precheck; serial already removed from stock");
                Err(ApiError::person_not_found(group, full_name))
            }
        }
    }

    /// Clear a person's intention cell and put the serial back in stock.
    pub async fn return_intention(
        &self,
        full_name: &str,
        group: &str,
        intention_type: &str,
        serial: &str,
    ) -> ApiResult<OperationReport> {
        let full_name = require(full_name, "full_name")?;
        let group = self.require_group(group)?;
        let intention_type = require(intention_type, "intention_type")?;
        let serial = require(serial, "serial_number")?;

        let headers = SchemaRegistry::new(self.store, self.layout)
            .headers(group)
            .await?;
        if column_index(&headers, intention_type).is_none() {
            return Err(ApiError::column_not_found(group, intention_type));
        }

        match self
            .assignments()
            .return_assignment(group, full_name, intention_type, serial)
            .await?
        {
            ReturnOutcome::Returned { row } => {
                let stock = self.layout.intention_stock.as_str();
                let restocked = self
                    .mutator()
                    .insert_into_stock(stock, intention_type, serial)
                    .await?;
                if let InsertOutcome::DuplicateRejected { .. } = restocked {
                    tracing::warn!(serial = %serial, intention_type = %intention_type, "Returned serial was already in stock");
                }
                self.finish(OperationReport::new(
                    "return_intention",
                    format!(
                        "Returned serial '{}' from {} and added back to stock.",
                        serial, full_name
                    ),
                    json!({ "group": group, "row": row, "restock": restocked }),
                ))
                .await
            }
            ReturnOutcome::Mismatch { on_record, .. } => Err(ApiError::state_conflict(format!(
                "Serial number '{}' not found for {} under '{}'",
                serial, full_name, intention_type
            ))
            .with_details(json!({ "on_record": on_record }))),
            ReturnOutcome::PersonNotFound => Err(ApiError::person_not_found(group, full_name)),
        }
    }

    /// Return everything a person holds and drop their row.
    pub async fn return_all(&self, full_name: &str, group: &str) -> ApiResult<OperationReport> {
        let full_name = require(full_name, "full_name")?;
        let group = self.require_group(group)?;

        match self.assignments().return_all(group, full_name).await? {
            ReturnAllOutcome::Returned { row, items } => {
                self.finish(OperationReport::new(
                    "return_all",
                    format!("Returned all items for {}", full_name),
                    json!({ "group": group, "row": row, "items": items }),
                ))
                .await
            }
            ReturnAllOutcome::PersonNotFound => Err(ApiError::person_not_found(group, full_name)),
        }
    }

    // ========================================================================
    // REPAIR
    // ========================================================================

    pub async fn send_to_repair(
        &self,
        is_weapon: bool,
        item_type: &str,
        serial: &str,
    ) -> ApiResult<OperationReport> {
        let source = self.stock_for(is_weapon);
        let destination = self.layout.repair_stock.as_str();
        self.move_item("send_to_repair", source, destination, item_type, serial)
            .await
    }

    pub async fn receive_from_repair(
        &self,
        is_weapon: bool,
        item_type: &str,
        serial: &str,
    ) -> ApiResult<OperationReport> {
        let source = self.layout.repair_stock.as_str();
        let destination = self.stock_for(is_weapon);
        self.move_item("receive_from_repair", source, destination, item_type, serial)
            .await
    }

    async fn move_item(
        &self,
        operation: &str,
        source: &str,
        destination: &str,
        item_type: &str,
        serial: &str,
    ) -> ApiResult<OperationReport> {
        let item_type = require(item_type, "item_type")?;
        let serial = require(serial, "serial_number")?;

        match self
            .mutator()
            .move_serial(source, destination, item_type, serial)
            .await?
        {
            MoveOutcome::Rejected {
                reason: MoveRejection::UnknownType,
            } => Err(ApiError::column_not_found(source, item_type)),
            MoveOutcome::Rejected {
                reason: MoveRejection::SerialNotFound,
            } => Err(ApiError::serial_not_found(source, item_type, serial)),
            MoveOutcome::Moved {
                source_row,
                destination: inserted,
            } => {
                if let InsertOutcome::DuplicateRejected { .. } = inserted {
                    tracing::warn!(destination = %destination, serial = %serial, "Moved serial was already present at destination");
                }
                self.finish(OperationReport::new(
                    operation,
                    format!(
                        "Moved {} {} from {} to {}",
                        item_type, serial, source, destination
                    ),
                    json!({
                        "source": source,
                        "destination": destination,
                        "source_row": source_row,
                        "result": inserted,
                    }),
                ))
                .await
            }
        }
    }

    // ========================================================================
    // SCHEMA AND SUMMARY
    // ========================================================================

    pub async fn sync_schema(&self) -> ApiResult<OperationReport> {
        let report = SchemaRegistry::new(self.store, self.layout)
            .sync_intention_columns()
            .await?;
        self.finish(OperationReport::new(
            "sync_schema",
            format!("Synced intention columns, {} added", report.columns_added()),
            serde_json::to_value(&report)?,
        ))
        .await
    }

    /// Counts per item type for weapons and optics. Read-only.
    pub async fn summary(&self) -> ApiResult<SummaryResponse> {
        let sections = Aggregator::new(self.store, self.layout)
            .aggregate_all()
            .await?
            .into_iter()
            .map(|(section, aggregate)| SummarySection {
                title: section.title,
                rows: render_summary(&aggregate)
                    .into_iter()
                    .map(|row| SummaryRowResponse {
                        item_type: row.item_type,
                        group_counts: row.group_counts,
                        stock_counts: row.stock_counts,
                        groups_total: row.groups_total,
                        stocks_total: row.stocks_total,
                        grand_total: row.grand_total,
                    })
                    .collect(),
                groups: aggregate.groups,
                stocks: aggregate.stocks,
            })
            .collect();
        Ok(SummaryResponse { sections })
    }

    pub async fn refresh_summary_sheet(&self) -> ApiResult<OperationReport> {
        let rows = Aggregator::new(self.store, self.layout)
            .refresh_summary_sheet()
            .await?;
        let sheet = self.layout.summary_sheet.as_str();
        self.finish(OperationReport::new(
            "refresh_summary_sheet",
            format!("Wrote {} rows to {}", rows, sheet),
            json!({ "sheet": sheet, "rows": rows }),
        ))
        .await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use armory_test_utils::assertions::{column_values, serial_locations};
    use armory_test_utils::fixtures::{seeded_ledger, small_layout};
    use armory_test_utils::InMemoryLedger;

    fn setup() -> (InMemoryLedger, LedgerLayout) {
        let layout = small_layout();
        let store = seeded_ledger(&layout);
        (store, layout)
    }

    fn audit_rows(store: &InMemoryLedger, layout: &LedgerLayout) -> usize {
        store
            .snapshot_of(&layout.audit_sheet)
            .map(|s| s.row_count())
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn test_add_weapon_audits_and_rejects_duplicates() {
        let (store, layout) = setup();
        let service = InventoryService::new(&store, &layout);

        let report = service.add_weapon("M4", "W7").await.unwrap();
        assert_eq!(report.operation, "add_weapon");
        assert!(column_values(&store, &layout.weapon_stock, "M4").contains(&"W7".to_string()));
        assert_eq!(audit_rows(&store, &layout), 1);

        let err = service.add_weapon("M4", "W7").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateSerial);
        assert_eq!(audit_rows(&store, &layout), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_serial_held_elsewhere() {
        let (store, layout) = setup();
        let service = InventoryService::new(&store, &layout);

        let err = service.add_weapon("M4", "W1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateSerial);
        let held_in = &err.details.as_ref().unwrap()["held_in"];
        assert_eq!(held_in["sheet"], layout.groups[0].as_str());
        assert_eq!(held_in["row"], 2);

        let err = service.add_weapon("M16", "W2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateSerial);

        let err = service.add_intention("ACOG", "A7").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateSerial);

        assert_eq!(store.write_count(), 0);
        assert_eq!(
            serial_locations(&store, &layout, "W1"),
            vec![(layout.groups[0].clone(), layout.group_columns.weapon_serial.clone(), 2)]
        );
    }

    #[tokio::test]
    async fn test_blank_field_is_missing_field() {
        let (store, layout) = setup();
        let err = InventoryService::new(&store, &layout)
            .add_weapon("M4", "   ")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_add_intention_syncs_group_columns() {
        let (store, layout) = setup();
        let report = InventoryService::new(&store, &layout)
            .add_intention("PEQ", "P1")
            .await
            .unwrap();
        assert_eq!(report.details["columns_added"], 2);
        for group in &layout.groups {
            let headers = store.snapshot_of(group).unwrap().headers().to_vec();
            assert_eq!(headers.last().map(String::as_str), Some("PEQ"));
        }
    }

    #[tokio::test]
    async fn test_assign_weapon_enrolls_before_summary_row() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        let report = InventoryService::new(&store, &layout)
            .assign_weapon("Avi", &group, "M4", "W2", Some("M5"))
            .await
            .unwrap();
        assert_eq!(report.details["row"], 4);

        let snap = store.snapshot_of(&group).unwrap();
        assert_eq!(&snap.rows[3][..6], ["3", "M4", "", "M5", "W2", "Avi"]);
        assert!(snap.has_summary_row());
        assert_eq!(column_values(&store, &layout.weapon_stock, "M4"), vec!["W3"]);
        assert_eq!(column_values(&store, &layout.intention_stock, "M5"), vec!["1"]);
    }

    #[tokio::test]
    async fn test_assign_weapon_prechecks_write_nothing() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        let service = InventoryService::new(&store, &layout);

        let err = service
            .assign_weapon(" Dana ", &group, "M4", "W2", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyEnrolled);

        let err = service
            .assign_weapon("Avi", &group, "M4", "W99", Some("M5"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SerialNotFound);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_assign_weapon_rejects_non_group_sheet() {
        let (store, layout) = setup();
        let err = InventoryService::new(&store, &layout)
            .assign_weapon("Avi", &layout.weapon_stock, "M4", "W2", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_assign_intention_moves_serial_to_person() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        InventoryService::new(&store, &layout)
            .assign_intention("Noa", &group, "ACOG", "A1")
            .await
            .unwrap();

        let locations = serial_locations(&store, &layout, "A1");
        assert_eq!(locations, vec![(group, "ACOG".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_assign_intention_occupied_slot_keeps_stock() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        let err = InventoryService::new(&store, &layout)
            .assign_intention("Dana", &group, "ACOG", "A1")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AlreadyAssigned);
        assert_eq!(column_values(&store, &layout.intention_stock, "ACOG"), vec!["A1"]);
    }

    #[tokio::test]
    async fn test_return_intention_mismatch_and_success() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        let service = InventoryService::new(&store, &layout);

        let err = service
            .return_intention("Dana", &group, "ACOG", "A8")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StateConflict);
        assert_eq!(err.details.as_ref().unwrap()["on_record"], "A7");

        service
            .return_intention("Dana", &group, "ACOG", "A7")
            .await
            .unwrap();
        assert_eq!(
            column_values(&store, &layout.intention_stock, "ACOG"),
            vec!["A1", "A7"]
        );
    }

    #[tokio::test]
    async fn test_return_intention_unknown_column() {
        let (store, layout) = setup();
        let group = layout.groups[0].clone();
        let err = InventoryService::new(&store, &layout)
            .return_intention("Dana", &group, "PEQ", "P1")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ColumnNotFound);
    }

    #[tokio::test]
    async fn test_repair_round_trip_and_rejections() {
        let (store, layout) = setup();
        let service = InventoryService::new(&store, &layout);

        service.send_to_repair(true, "M16", "W10").await.unwrap();
        assert_eq!(column_values(&store, &layout.repair_stock, "M16"), vec!["W10"]);
        service.receive_from_repair(true, "M16", "W10").await.unwrap();
        assert_eq!(column_values(&store, &layout.weapon_stock, "M16"), vec!["W10"]);

        let err = service.send_to_repair(true, "Negev", "N1").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ColumnNotFound);
        let err = service.send_to_repair(false, "ACOG", "A99").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SerialNotFound);
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_operation() {
        let (store, layout) = setup();
        store.fail_writes(&layout.audit_sheet);
        let report = InventoryService::new(&store, &layout)
            .add_weapon("M16", "W12")
            .await;
        assert!(report.is_ok());
        assert_eq!(audit_rows(&store, &layout), 0);
    }

    #[tokio::test]
    async fn test_summary_sections() {
        let (store, layout) = setup();
        let summary = InventoryService::new(&store, &layout).summary().await.unwrap();
        assert_eq!(summary.sections.len(), 2);

        let weapons = &summary.sections[0];
        let m4 = weapons.rows.iter().find(|r| r.item_type == "M4").unwrap();
        assert_eq!((m4.groups_total, m4.stocks_total, m4.grand_total), (1, 2, 3));
    }

    #[tokio::test]
    async fn test_refresh_summary_sheet_creates_sheet() {
        let layout = small_layout();
        let store = seeded_ledger(&layout);
        let report = InventoryService::new(&store, &layout)
            .refresh_summary_sheet()
            .await
            .unwrap();
        let snap = store.snapshot_of(&layout.summary_sheet).unwrap();
        assert_eq!(snap.cell(1, 1), "נשקים");
        assert_eq!(report.details["rows"], snap.row_count());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_require_trims_or_rejects(value in "[ \t]{0,3}[A-Z0-9]{0,4}[ \t]{0,3}") {
                match require(&value, "serial_number") {
                    Ok(trimmed) => {
                        prop_assert!(!trimmed.is_empty());
                        prop_assert_eq!(trimmed, value.trim());
                    }
                    Err(e) => {
                        prop_assert_eq!(e.code, ErrorCode::MissingField);
                        prop_assert!(value.trim().is_empty());
                    }
                }
            }

            #[test]
            fn prop_blank_serial_never_writes(serial in "[ \t]{0,4}") {
                let (store, layout) = setup();
                let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
                let result = runtime.block_on(InventoryService::new(&store, &layout).add_weapon("M4", &serial));
                prop_assert!(result.is_err());
                prop_assert_eq!(store.write_count(), 0);
            }
        }
    }
}
