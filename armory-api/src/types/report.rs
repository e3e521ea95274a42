//! Operation result and summary types

use serde::{Deserialize, Serialize};

/// Result of a successful ledger operation.
///
/// This is also the JSON written to the audit worksheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OperationReport {
    /// Operation name, e.g. `send_to_repair`
    pub operation: String,
    /// Human-readable summary
    pub message: String,
    /// Structured outcome (rows written, serials moved)
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub details: serde_json::Value,
}

impl OperationReport {
    pub fn new(operation: &str, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            operation: operation.to_string(),
            message: message.into(),
            details,
        }
    }
}

/// Counts for one item type across every worksheet of a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SummaryRowResponse {
    pub item_type: String,
    /// Same order as the section's `groups`
    pub group_counts: Vec<usize>,
    /// Same order as the section's `stocks`
    pub stock_counts: Vec<usize>,
    pub groups_total: usize,
    pub stocks_total: usize,
    pub grand_total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SummarySection {
    pub title: String,
    pub groups: Vec<String>,
    pub stocks: Vec<String>,
    pub rows: Vec<SummaryRowResponse>,
}

/// Response for GET /summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SummaryResponse {
    pub sections: Vec<SummarySection>,
}
