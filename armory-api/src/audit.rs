//! Audit Log
//!
//! Appends one row per successful operation to the audit worksheet:
//! `[RFC 3339 timestamp, JSON report]`. Writes are best-effort; a failure
//! is logged and never fails the operation it documents.

use armory_storage::LedgerStore;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub struct AuditLog<'a> {
    store: &'a dyn LedgerStore,
    sheet: &'a str,
}

impl<'a> AuditLog<'a> {
    pub fn new(store: &'a dyn LedgerStore, sheet: &'a str) -> Self {
        Self { store, sheet }
    }

    /// Append `entry` as JSON. Returns whether the row was written.
    pub async fn record<T: Serialize>(&self, entry: &T) -> bool {
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Audit entry could not be serialized");
                return false;
            }
        };
        let row = vec![Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true), json];

        match self.store.append_row(self.sheet, row).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(sheet = %self.sheet, error = %e, "Audit write failed");
                false
            }
        }
    }
}
