//! Error types for ledger operations

use thiserror::Error;

/// Storage layer errors raised by a `LedgerStore` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Worksheet not found: {worksheet}")]
    WorksheetNotFound { worksheet: String },

    #[error("Worksheet already exists: {worksheet}")]
    AlreadyExists { worksheet: String },

    #[error("Cell ({row}, {col}) is outside the grid of {worksheet} ({rows}x{cols})")]
    OutOfGrid {
        worksheet: String,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Ledger store unavailable during {operation}: {reason}")]
    StoreUnavailable { operation: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    /// Shorthand for a transport failure while performing `operation`.
    pub fn unavailable(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        StorageError::StoreUnavailable {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn worksheet_not_found(worksheet: impl Into<String>) -> Self {
        StorageError::WorksheetNotFound {
            worksheet: worksheet.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

/// Master error type for ledger operations.
///
/// Rejections that are part of normal operation (duplicate serial, occupied
/// assignment slot, serial mismatch) are modelled as outcome enums by the
/// ledger crate, not as errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Column '{column}' not found in worksheet {worksheet}")]
    ColumnNotFound { worksheet: String, column: String },

    #[error("Worksheet {worksheet} has no '{column}' column")]
    MissingNameColumn { worksheet: String, column: String },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl LedgerError {
    /// True when the underlying store call itself failed.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(
            self,
            LedgerError::Storage(StorageError::StoreUnavailable { .. })
                | LedgerError::Storage(StorageError::LockPoisoned)
        )
    }
}

/// Result type alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// TESTS
// =============================================================================
