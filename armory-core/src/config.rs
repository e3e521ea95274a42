//! Ledger layout configuration
//!
//! Names of the worksheets that make up the armory spreadsheet and the
//! fixed column layout of group worksheets. The default mirrors the deployed
//! spreadsheet; a TOML file can override any field.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fixed leading columns of a group worksheet, by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GroupColumns {
    pub ordinal: String,
    pub weapon_type: String,
    pub quantity: String,
    pub intention_type: String,
    /// Serial number of the assigned weapon.
    pub weapon_serial: String,
    pub full_name: String,
    pub notes: String,
}

impl GroupColumns {
    /// Header row in sheet order.
    pub fn header_row(&self) -> Vec<String> {
        vec![
            self.ordinal.clone(),
            self.weapon_type.clone(),
            self.quantity.clone(),
            self.intention_type.clone(),
            self.weapon_serial.clone(),
            self.full_name.clone(),
            self.notes.clone(),
        ]
    }
}

impl Default for GroupColumns {
    fn default() -> Self {
        Self {
            ordinal: "מספר סידורי".to_string(),
            weapon_type: "סוג נשק".to_string(),
            quantity: "כמות".to_string(),
            intention_type: "כוונת".to_string(),
            weapon_serial: "מסד".to_string(),
            full_name: "שם מלא".to_string(),
            notes: "הערות".to_string(),
        }
    }
}

/// Worksheet names and per-type policy for the whole ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct LedgerLayout {
    pub weapon_stock: String,
    pub intention_stock: String,
    pub repair_stock: String,
    pub audit_sheet: String,
    pub summary_sheet: String,
    /// One worksheet per person-group, in display order.
    pub groups: Vec<String>,
    pub group_columns: GroupColumns,
    /// Intention types tracked as counted units rather than unique serials.
    /// They may repeat within a column and are never synced as group columns.
    pub counted_intentions: Vec<String>,
    /// Serial written for one unit of a counted intention type.
    pub counted_unit_serial: String,
}

impl Default for LedgerLayout {
    fn default() -> Self {
        Self {
            weapon_stock: "מלאי נשקיה".to_string(),
            intention_stock: "מלאי אופטיקה".to_string(),
            repair_stock: "תקול לסדנא".to_string(),
            audit_sheet: "תיעוד".to_string(),
            summary_sheet: "טבלת נשקיה".to_string(),
            groups: ["א", "ב", "ג", "מסייעת", "אלון", "מכלול", "פלסם"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            group_columns: GroupColumns::default(),
            counted_intentions: vec!["M5".to_string(), "מאפרו".to_string()],
            counted_unit_serial: "1".to_string(),
        }
    }
}

impl LedgerLayout {
    /// Parse a layout from TOML text. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let layout: LedgerLayout = toml::from_str(text).map_err(|e| ConfigError::InvalidValue {
            field: "layout".to_string(),
            value: "<toml>".to_string(),
            reason: e.to_string(),
        })?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from the file named by `ARMORY_LAYOUT_FILE`, or the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var("ARMORY_LAYOUT_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let stocks = [
            ("weapon_stock", &self.weapon_stock),
            ("intention_stock", &self.intention_stock),
            ("repair_stock", &self.repair_stock),
            ("audit_sheet", &self.audit_sheet),
            ("summary_sheet", &self.summary_sheet),
        ];
        for (field, value) in stocks {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: field.to_string(),
                });
            }
        }
        if let Some(clash) = self.groups.iter().find(|g| {
            stocks.iter().any(|(_, s)| s.as_str() == g.as_str())
        }) {
            return Err(ConfigError::InvalidValue {
                field: "groups".to_string(),
                value: clash.clone(),
                reason: "group name collides with a reserved worksheet".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `type_name` may hold the same serial more than once.
    pub fn is_counted(&self, type_name: &str) -> bool {
        self.counted_intentions.iter().any(|t| t == type_name)
    }

    /// Stock worksheets contributing to summaries (weapons, then intentions).
    pub fn stock_sheets(&self) -> Vec<String> {
        vec![self.weapon_stock.clone(), self.intention_stock.clone()]
    }

    /// Every worksheet the ledger expects to exist.
    pub fn all_sheets(&self) -> Vec<String> {
        let mut sheets = self.groups.clone();
        sheets.extend([
            self.weapon_stock.clone(),
            self.intention_stock.clone(),
            self.repair_stock.clone(),
            self.audit_sheet.clone(),
            self.summary_sheet.clone(),
        ]);
        sheets
    }

    pub fn is_group(&self, sheet: &str) -> bool {
        self.groups.iter().any(|g| g == sheet)
    }
}
