//! Service Layer
//!
//! Composite inventory operations. Each one sequences several ledger calls,
//! maps rejections to `ApiError`s and writes an audit row on success.

mod inventory_service;

pub use inventory_service::*;
