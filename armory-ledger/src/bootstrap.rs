//! Worksheet bootstrap
//!
//! Creates whatever configured worksheets are missing and writes the fixed
//! header into empty group worksheets. Populated worksheets are never
//! cleared or overwritten.

use crate::schema::{SchemaRegistry, SyncReport};
use armory_core::{LedgerLayout, LedgerResult};
use armory_storage::LedgerStore;
use serde::Serialize;
use tracing::{info, warn};

pub const DEFAULT_ROWS: usize = 100;
pub const DEFAULT_COLS: usize = 40;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    pub created: Vec<String>,
    pub headers_written: Vec<String>,
    /// Group worksheets whose header differs from the configured one.
    pub header_mismatches: Vec<String>,
    pub sync: SyncReport,
}

pub async fn bootstrap(store: &dyn LedgerStore, layout: &LedgerLayout) -> LedgerResult<BootstrapReport> {
    let mut report = BootstrapReport::default();
    let existing = store.worksheet_titles().await?;

    for sheet in layout.all_sheets() {
        if existing.iter().any(|t| *t == sheet) {
            continue;
        }
        store.create_worksheet(&sheet, DEFAULT_ROWS, DEFAULT_COLS).await?;
        info!(sheet = %sheet, "Created worksheet");
        report.created.push(sheet);
    }

    let header = layout.group_columns.header_row();
    for group in &layout.groups {
        let current = store.row_values(group, 1).await?;
        if current.is_empty() {
            store.append_row(group, header.clone()).await?;
            report.headers_written.push(group.clone());
        } else if !current.starts_with(&header) {
            warn!(sheet = %group, found = ?current, "Group header differs from the configured layout, left as is");
            report.header_mismatches.push(group.clone());
        }
    }

    report.sync = SchemaRegistry::new(store, layout)
        .sync_intention_columns()
        .await?;
    info!(
        created = report.created.len(),
        headers_written = report.headers_written.len(),
        columns_added = report.sync.columns_added(),
        "Ledger bootstrap complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_storage::InMemoryLedger;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[tokio::test]
    async fn test_bootstrap_empty_store() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new();
        let report = bootstrap(&store, &layout).await.unwrap();

        assert_eq!(report.created.len(), layout.all_sheets().len());
        assert_eq!(report.headers_written, layout.groups);
        assert_eq!(report.sync.columns_added(), 0);
        let snap = store.snapshot_of("א").unwrap();
        assert_eq!(snap.headers(), &layout.group_columns.header_row()[..]);
        assert_eq!(store.grid_size("א"), Some((DEFAULT_ROWS, DEFAULT_COLS)));
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_populated_sheets() {
        let layout = LedgerLayout {
            groups: vec!["א".to_string()],
            ..LedgerLayout::default()
        };
        let store = InMemoryLedger::new()
            .with_sheet("א", vec![row(&["legacy", "header"]), row(&["1", "x"])])
            .with_sheet(&layout.intention_stock, vec![row(&["ACOG"])]);

        let report = bootstrap(&store, &layout).await.unwrap();
        assert_eq!(report.header_mismatches, vec!["א"]);
        assert!(!report.created.contains(&"א".to_string()));
        let snap = store.snapshot_of("א").unwrap();
        assert_eq!(snap.cell(2, 2), "x");
        assert_eq!(snap.headers(), &row(&["legacy", "header", "ACOG"])[..]);
    }

    #[tokio::test]
    async fn test_bootstrap_twice_changes_nothing() {
        let layout = LedgerLayout::default();
        let store = InMemoryLedger::new();
        bootstrap(&store, &layout).await.unwrap();
        let writes = store.write_count();
        let report = bootstrap(&store, &layout).await.unwrap();
        assert!(report.created.is_empty());
        assert!(report.headers_written.is_empty());
        assert_eq!(store.write_count(), writes);
    }
}
