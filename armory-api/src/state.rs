//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use armory_core::LedgerLayout;
use armory_storage::LedgerStore;

use crate::services::InventoryService;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The spreadsheet, or the in-memory fake in `memory` mode.
    pub store: Arc<dyn LedgerStore>,
    pub layout: Arc<LedgerLayout>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, layout: LedgerLayout) -> Self {
        Self {
            store,
            layout: Arc::new(layout),
            start_time: Instant::now(),
        }
    }

    /// Service view over this state for one request.
    pub fn inventory(&self) -> InventoryService<'_> {
        InventoryService::new(self.store.as_ref(), self.layout.as_ref())
    }
}

crate::impl_from_ref!(Arc<dyn LedgerStore>, store);
crate::impl_from_ref!(Arc<LedgerLayout>, layout);
crate::impl_from_ref!(Instant, start_time);
