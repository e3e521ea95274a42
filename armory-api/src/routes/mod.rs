//! REST API Routes Module
//!
//! Route handlers grouped by concern:
//! - Stock intake (weapon and intention serials)
//! - Assignment to people in group worksheets
//! - Repair moves
//! - Summaries and schema sync
//! - Health checks (Kubernetes-compatible)
//!
//! CORS is configured for browser clients; requests are unauthenticated.

pub mod assign;
pub mod health;
pub mod repair;
pub mod stock;
pub mod summary;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::state::AppState;
use crate::telemetry::{metrics_handler, observability_middleware};

pub use assign::create_router as assign_router;
pub use health::create_router as health_router;
pub use repair::create_router as repair_router;
pub use stock::create_router as stock_router;
pub use summary::create_router as summary_router;

pub const BANNER: &str = "Armory Backend is running";

/// GET / - Service banner
async fn root() -> impl IntoResponse {
    Json(json!({ "message": BANNER }))
}

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

#[cfg(feature = "openapi")]
async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// CORS LAYER
// ============================================================================

/// Build the CORS layer from ApiConfig.
///
/// With no configured origins every origin is allowed; otherwise only the
/// configured ones, where `*.domain` matches any https subdomain.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let allowed = config.clone();
        let cors = cors.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| allowed.is_origin_allowed(o))
                .unwrap_or(false)
        }));

        if config.cors_allow_credentials {
            cors.allow_credentials(true)
        } else {
            cors
        }
    }
}

/// Create the complete API router.
///
/// # Middleware Order (outer to inner)
/// 1. CORS - handles preflight requests
/// 2. Observability - span per request, Prometheus metrics
/// 3. TraceLayer - tower-http request/response events
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    #[allow(unused_mut)]
    let mut router = Router::new()
        .route("/", get(root))
        .merge(stock::create_router())
        .merge(assign::create_router())
        .merge(repair::create_router())
        .merge(summary::create_router())
        .nest("/health", health::create_router())
        .route("/metrics", get(metrics_handler));

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", get(openapi_json));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(observability_middleware))
        .layer(build_cors_layer(config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_both_modes() {
        let open = ApiConfig::default();
        let _ = build_cors_layer(&open);

        let locked = ApiConfig {
            cors_origins: vec!["https://armory.example".to_string()],
            cors_allow_credentials: true,
            ..ApiConfig::default()
        };
        let _ = build_cors_layer(&locked);
    }
}
