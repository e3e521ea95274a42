//! Health Check Endpoints
//!
//! Kubernetes-compatible health checks:
//! - /health/ping - Simple liveness check
//! - /health/live - Process alive check
//! - /health/ready - Ledger store reachability and worksheet presence

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use armory_core::{HealthCheck, HealthStatus, LedgerLayout};
use armory_storage::LedgerStore;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::state::AppState;

const STORE_COMPONENT: &str = "ledger-store";

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub store: HealthCheck,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse),
    ),
)]
pub async fn liveness() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Process is alive".to_string()),
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - Readiness check (store reachable, worksheets present)
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Store is unreachable", body = HealthResponse),
    ),
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = check_store(state.store.as_ref(), &state.layout).await;
    let status = store.status;

    let response = HealthResponse {
        status,
        message: None,
        details: Some(HealthDetails {
            store,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    // A missing worksheet degrades the ledger but leaves the service usable.
    let status_code = if status == HealthStatus::Unhealthy {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status_code, Json(response))
}

/// Reachable with every configured worksheet is healthy; reachable with some
/// missing is degraded.
pub async fn check_store(store: &dyn LedgerStore, layout: &LedgerLayout) -> HealthCheck {
    let start = Instant::now();

    match store.worksheet_titles().await {
        Ok(titles) => {
            let elapsed = start.elapsed().as_millis() as u64;
            let missing: Vec<String> = layout
                .all_sheets()
                .into_iter()
                .filter(|sheet| !titles.contains(sheet))
                .collect();
            let check = if missing.is_empty() {
                HealthCheck::healthy(STORE_COMPONENT)
            } else {
                HealthCheck::degraded(
                    STORE_COMPONENT,
                    format!("Missing worksheets: {}", missing.join(", ")),
                )
            };
            check.with_response_time(elapsed)
        }
        Err(e) => HealthCheck::unhealthy(STORE_COMPONENT, format!("Store check failed: {}", e)),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_test_utils::fixtures::{empty_ledger, small_layout};

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            message: Some("All systems operational".to_string()),
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(!json.contains("details"));
    }

    #[tokio::test]
    async fn test_check_store_healthy_when_every_sheet_exists() {
        let layout = small_layout();
        let store = empty_ledger(&layout);
        let check = check_store(&store, &layout).await;
        assert!(check.is_healthy());
        assert!(check.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn test_check_store_degraded_names_missing_sheets() {
        let layout = small_layout();
        let store = armory_storage::InMemoryLedger::new().with_sheet("א", Vec::new());
        let check = check_store(&store, &layout).await;
        assert_eq!(check.status, HealthStatus::Degraded);
        let message = check.message.unwrap_or_default();
        assert!(message.contains(&layout.weapon_stock));
        assert!(!message.contains(": א"));
    }

    #[tokio::test]
    async fn test_check_store_unhealthy_when_offline() {
        let layout = small_layout();
        let store = empty_ledger(&layout);
        store.set_offline(true);
        let check = check_store(&store, &layout).await;
        assert_eq!(check.status, HealthStatus::Unhealthy);
    }
}
