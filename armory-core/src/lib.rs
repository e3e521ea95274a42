//! Armory Core - Ledger Data Types
//!
//! Pure data structures shared by every other crate: the worksheet grid
//! snapshot, the ledger layout, error enums and health types.
//! This crate performs no I/O against the ledger store.

pub mod config;
pub mod error;
pub mod grid;
pub mod health;

pub use config::{GroupColumns, LedgerLayout};
pub use error::{ConfigError, LedgerError, LedgerResult, StorageError};
pub use grid::{column_index, column_letter, pad_row, SheetSnapshot, SUMMARY_ROW_LABEL};
pub use health::{HealthCheck, HealthStatus};
