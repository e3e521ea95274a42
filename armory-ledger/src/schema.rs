//! Schema Registry
//!
//! Header rows are the schema: every item type is a column named after it.
//! Column creation is kept apart from data mutation so that it can be made
//! idempotent and checked on its own.

use armory_core::{column_index, LedgerLayout, LedgerResult, StorageError};
use armory_storage::LedgerStore;
use serde::Serialize;
use tracing::{debug, warn};

/// A resolved type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnRef {
    /// 1-based column index.
    pub index: usize,
    /// Whether this call appended the column.
    pub created: bool,
}

/// Columns appended to one group worksheet by a schema sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSync {
    pub sheet: String,
    pub added: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub known_types: Vec<String>,
    pub sheets: Vec<SheetSync>,
    /// Group worksheets that do not exist in the store.
    pub skipped: Vec<String>,
}

impl SyncReport {
    pub fn columns_added(&self) -> usize {
        self.sheets.iter().map(|s| s.added.len()).sum()
    }
}

/// Intention types that every group worksheet must carry a column for:
/// the intention-stock headers minus blanks and counted types, deduplicated
/// in header order.
pub fn known_intention_types(stock_headers: &[String], layout: &LedgerLayout) -> Vec<String> {
    let mut known: Vec<String> = Vec::new();
    for header in stock_headers {
        let name = header.trim();
        if name.is_empty() || layout.is_counted(name) || known.iter().any(|k| k == name) {
            continue;
        }
        known.push(name.to_string());
    }
    known
}

pub struct SchemaRegistry<'a> {
    store: &'a dyn LedgerStore,
    layout: &'a LedgerLayout,
}

impl<'a> SchemaRegistry<'a> {
    pub fn new(store: &'a dyn LedgerStore, layout: &'a LedgerLayout) -> Self {
        Self { store, layout }
    }

    pub async fn headers(&self, sheet: &str) -> LedgerResult<Vec<String>> {
        Ok(self.store.row_values(sheet, 1).await?)
    }

    /// Column of `type_name`, appending it when absent. Calling again with
    /// the same name returns the same column.
    pub async fn ensure_column(&self, sheet: &str, type_name: &str) -> LedgerResult<ColumnRef> {
        let headers = self.headers(sheet).await?;
        if let Some(index) = column_index(&headers, type_name) {
            return Ok(ColumnRef {
                index,
                created: false,
            });
        }

        let index = headers.len() + 1;
        self.store.add_cols(sheet, 1).await?;
        self.store.update_cell(sheet, 1, index, type_name).await?;
        debug!(sheet = %sheet, type_name = %type_name, column = index, "Created type column");
        Ok(ColumnRef {
            index,
            created: true,
        })
    }

    /// Bring every group worksheet's header suffix up to the set of known
    /// intention types. Existing columns keep their positions; missing ones
    /// are appended in one batch per sheet.
    pub async fn sync_intention_columns(&self) -> LedgerResult<SyncReport> {
        let stock_headers = self.headers(&self.layout.intention_stock).await?;
        let known = known_intention_types(&stock_headers, self.layout);
        let mut report = SyncReport {
            known_types: known.clone(),
            ..SyncReport::default()
        };

        for sheet in &self.layout.groups {
            let headers = match self.headers(sheet).await {
                Ok(headers) => headers,
                Err(armory_core::LedgerError::Storage(StorageError::WorksheetNotFound { .. })) => {
                    warn!(sheet = %sheet, "Group worksheet missing, schema sync skipped");
                    report.skipped.push(sheet.clone());
                    continue;
                }
                Err(e) => return Err(e),
            };

            let missing: Vec<String> = known
                .iter()
                .filter(|t| column_index(&headers, t).is_none())
                .cloned()
                .collect();
            if missing.is_empty() {
                continue;
            }

            self.store.add_cols(sheet, missing.len()).await?;
            for (offset, name) in missing.iter().enumerate() {
                self.store
                    .update_cell(sheet, 1, headers.len() + 1 + offset, name)
                    .await?;
            }
            debug!(sheet = %sheet, added = ?missing, "Synced intention columns");
            report.sheets.push(SheetSync {
                sheet: sheet.clone(),
                added: missing,
            });
        }

        Ok(report)
    }
}
