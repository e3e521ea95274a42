//! Armory API Server Entry Point
//!
//! Loads configuration, connects the ledger store, optionally bootstraps the
//! worksheets and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use armory_api::{
    create_api_router, telemetry::init_tracing, ApiConfig, ApiError, ApiResult, AppState,
    SheetsClient, SheetsConfig, StoreKind,
};
use armory_core::LedgerLayout;
use armory_storage::{InMemoryLedger, LedgerStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracing()?;

    let api_config = ApiConfig::from_env()?;
    let layout = LedgerLayout::from_env()?;

    let store: Arc<dyn LedgerStore> = match api_config.store {
        StoreKind::Sheets => {
            let sheets_config = SheetsConfig::from_env()?;
            tracing::info!(spreadsheet = %sheets_config.spreadsheet_id, "Using Google Sheets store");
            Arc::new(SheetsClient::from_config(&sheets_config)?)
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; ledger contents are lost on restart");
            Arc::new(InMemoryLedger::new())
        }
    };

    // The in-memory store starts empty, so it always needs its worksheets.
    if api_config.bootstrap_on_start || api_config.store == StoreKind::Memory {
        let report = armory_ledger::bootstrap(store.as_ref(), &layout).await?;
        tracing::info!(
            created = ?report.created,
            mismatched_headers = ?report.header_mismatches,
            "Worksheets ready"
        );
    }

    let app = create_api_router(AppState::new(store, layout), &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, strict_cors = api_config.is_production(), "Starting Armory API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind_host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
