//! Armory API - REST Layer and Google Sheets Adapter
//!
//! Exposes the armory ledger over HTTP (Axum). Each request runs one
//! composite inventory operation against a `LedgerStore`: the Google Sheets
//! REST adapter in production, or the in-memory grid for local runs.
//!
//! Successful operations are appended to the audit worksheet on a
//! best-effort basis.

pub mod macros;

pub mod audit;
pub mod config;
pub mod error;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod sheets;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use audit::AuditLog;
pub use config::{ApiConfig, SheetsConfig, SheetsCredentials, StoreKind};
pub use error::{ApiError, ApiResult, ErrorCode};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::InventoryService;
pub use sheets::SheetsClient;
pub use state::AppState;
pub use types::*;
