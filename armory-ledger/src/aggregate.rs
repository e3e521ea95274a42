//! Aggregator
//!
//! Counts items per worksheet for the summary view. Group worksheets are
//! counted by the value of a type column; stock worksheets are counted per
//! column, since each stock column header is an item type.

use armory_core::{LedgerError, LedgerLayout, LedgerResult, SheetSnapshot, StorageError};
use armory_storage::LedgerStore;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

pub const GROUPS_TOTAL_LABEL: &str = "סה\"כ לקבוצות";
pub const STOCKS_TOTAL_LABEL: &str = "סה\"כ למלאים";
pub const GRAND_TOTAL_LABEL: &str = "סה\"כ כללי";

/// One block of the summary: which group column names the item type and
/// which stock worksheet contributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSection {
    pub title: String,
    pub type_column: String,
    pub stock_sheet: String,
    /// Also count every intention-type column of group worksheets.
    pub include_intention_columns: bool,
}

impl AggregateSection {
    pub fn weapons(layout: &LedgerLayout) -> Self {
        Self {
            title: "נשקים".to_string(),
            type_column: layout.group_columns.weapon_type.clone(),
            stock_sheet: layout.weapon_stock.clone(),
            include_intention_columns: false,
        }
    }

    pub fn optics(layout: &LedgerLayout) -> Self {
        Self {
            title: "אופטיקה".to_string(),
            type_column: layout.group_columns.intention_type.clone(),
            stock_sheet: layout.intention_stock.clone(),
            include_intention_columns: true,
        }
    }
}

/// Counts for one item type, keyed by worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub item_type: String,
    pub counts: HashMap<String, usize>,
}

/// Item type -> worksheet -> count, in first-seen item order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub groups: Vec<String>,
    pub stocks: Vec<String>,
    items: Vec<ItemCounts>,
    index: HashMap<String, usize>,
}

impl Aggregate {
    pub fn new(groups: Vec<String>, stocks: Vec<String>) -> Self {
        Self {
            groups,
            stocks,
            ..Self::default()
        }
    }

    pub fn add(&mut self, item_type: &str, sheet: &str, n: usize) {
        let slot = match self.index.get(item_type) {
            Some(&i) => i,
            None => {
                self.items.push(ItemCounts {
                    item_type: item_type.to_string(),
                    counts: HashMap::new(),
                });
                self.index.insert(item_type.to_string(), self.items.len() - 1);
                self.items.len() - 1
            }
        };
        *self.items[slot].counts.entry(sheet.to_string()).or_insert(0) += n;
    }

    pub fn items(&self) -> &[ItemCounts] {
        &self.items
    }

    /// Count for a pair, 0 when never seen.
    pub fn count(&self, item_type: &str, sheet: &str) -> usize {
        self.index
            .get(item_type)
            .and_then(|&i| self.items[i].counts.get(sheet))
            .copied()
            .unwrap_or(0)
    }

    pub fn groups_total(&self, item_type: &str) -> usize {
        self.groups.iter().map(|g| self.count(item_type, g)).sum()
    }

    pub fn stocks_total(&self, item_type: &str) -> usize {
        self.stocks.iter().map(|s| self.count(item_type, s)).sum()
    }

    fn count_group_sheet(&mut self, snapshot: &SheetSnapshot, section: &AggregateSection, fixed: &[String]) {
        if let Some(col) = snapshot.column_of(&section.type_column) {
            for (_, value) in snapshot.column_cells(col) {
                let value = value.trim();
                if !value.is_empty() {
                    self.add(value, &snapshot.title, 1);
                }
            }
        }
        if section.include_intention_columns {
            for (i, header) in snapshot.headers().iter().enumerate() {
                let name = header.trim();
                if name.is_empty() || fixed.iter().any(|f| f == name) {
                    continue;
                }
                let n = non_empty(snapshot, i + 1);
                if n > 0 {
                    self.add(name, &snapshot.title, n);
                }
            }
        }
    }

    fn count_stock_sheet(&mut self, snapshot: &SheetSnapshot) {
        for (i, header) in snapshot.headers().iter().enumerate() {
            let name = header.trim();
            if name.is_empty() {
                continue;
            }
            let n = non_empty(snapshot, i + 1);
            if n > 0 {
                self.add(name, &snapshot.title, n);
            }
        }
    }
}

fn non_empty(snapshot: &SheetSnapshot, col: usize) -> usize {
    snapshot
        .column_cells(col)
        .filter(|(_, v)| !v.trim().is_empty())
        .count()
}

/// One rendered summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub item_type: String,
    /// Per-group counts, in the aggregate's group order.
    pub group_counts: Vec<usize>,
    pub stock_counts: Vec<usize>,
    pub groups_total: usize,
    pub stocks_total: usize,
    pub grand_total: usize,
}

impl SummaryRow {
    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = vec![self.item_type.clone()];
        cells.extend(self.group_counts.iter().map(usize::to_string));
        cells.extend(self.stock_counts.iter().map(usize::to_string));
        cells.push(self.groups_total.to_string());
        cells.push(self.stocks_total.to_string());
        cells.push(self.grand_total.to_string());
        cells
    }
}

/// One row per item type in first-seen order; missing pairs render as 0.
pub fn render_summary(aggregate: &Aggregate) -> Vec<SummaryRow> {
    aggregate
        .items()
        .iter()
        .map(|item| {
            let t = item.item_type.as_str();
            let groups_total = aggregate.groups_total(t);
            let stocks_total = aggregate.stocks_total(t);
            SummaryRow {
                item_type: item.item_type.clone(),
                group_counts: aggregate.groups.iter().map(|g| aggregate.count(t, g)).collect(),
                stock_counts: aggregate.stocks.iter().map(|s| aggregate.count(t, s)).collect(),
                groups_total,
                stocks_total,
                grand_total: groups_total + stocks_total,
            }
        })
        .collect()
}

/// Worksheet rows for one section: title, header, one row per item type.
pub fn section_sheet_rows(title: &str, aggregate: &Aggregate) -> Vec<Vec<String>> {
    let mut header = vec![String::new()];
    header.extend(aggregate.groups.iter().cloned());
    header.extend(aggregate.stocks.iter().cloned());
    header.extend([
        GROUPS_TOTAL_LABEL.to_string(),
        STOCKS_TOTAL_LABEL.to_string(),
        GRAND_TOTAL_LABEL.to_string(),
    ]);

    let mut rows = vec![vec![title.to_string()], header];
    rows.extend(render_summary(aggregate).iter().map(SummaryRow::to_cells));
    rows
}

pub struct Aggregator<'a> {
    store: &'a dyn LedgerStore,
    layout: &'a LedgerLayout,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a dyn LedgerStore, layout: &'a LedgerLayout) -> Self {
        Self { store, layout }
    }

    /// Read a worksheet, treating a missing one as absent.
    async fn read_optional(&self, sheet: &str) -> LedgerResult<Option<SheetSnapshot>> {
        match self.store.snapshot(sheet).await {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(StorageError::WorksheetNotFound { .. }) => {
                warn!(sheet = %sheet, "Worksheet missing, skipped in aggregation");
                Ok(None)
            }
            Err(e) => Err(LedgerError::from(e)),
        }
    }

    pub async fn aggregate(&self, section: &AggregateSection) -> LedgerResult<Aggregate> {
        let mut aggregate = Aggregate::new(
            self.layout.groups.clone(),
            vec![section.stock_sheet.clone()],
        );
        let fixed = self.layout.group_columns.header_row();

        for group in &self.layout.groups {
            if let Some(snapshot) = self.read_optional(group).await? {
                aggregate.count_group_sheet(&snapshot, section, &fixed);
            }
        }
        if let Some(snapshot) = self.read_optional(&section.stock_sheet).await? {
            aggregate.count_stock_sheet(&snapshot);
        }
        Ok(aggregate)
    }

    /// Weapons then optics.
    pub async fn aggregate_all(&self) -> LedgerResult<Vec<(AggregateSection, Aggregate)>> {
        let mut out = Vec::with_capacity(2);
        for section in [
            AggregateSection::weapons(self.layout),
            AggregateSection::optics(self.layout),
        ] {
            let aggregate = self.aggregate(&section).await?;
            out.push((section, aggregate));
        }
        Ok(out)
    }

    /// Rewrite the summary worksheet with every section, creating it first
    /// when missing. Returns the number of rows written.
    pub async fn refresh_summary_sheet(&self) -> LedgerResult<usize> {
        let sections = self.aggregate_all().await?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for (i, (section, aggregate)) in sections.iter().enumerate() {
            if i > 0 {
                rows.push(Vec::new());
            }
            rows.extend(section_sheet_rows(&section.title, aggregate));
        }

        let sheet = &self.layout.summary_sheet;
        let width = rows.iter().map(Vec::len).max().unwrap_or(1);
        if !self.store.has_worksheet(sheet).await? {
            self.store
                .create_worksheet(sheet, rows.len().max(1), width)
                .await?;
        }
        self.store.clear(sheet).await?;
        let written = rows.len();
        self.store.append_rows(sheet, rows).await?;
        Ok(written)
    }
}

// ============================================================================
// TESTS
// ============================================================================
