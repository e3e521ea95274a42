//! Summary and Schema REST Routes

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::record_operation,
    types::{OperationReport, SummaryResponse},
};

/// GET /summary - Per-type counts across groups and stock
#[utoipa::path(
    get,
    path = "/summary",
    tag = "Summary",
    responses(
        (status = 200, description = "Weapon and optic sections", body = SummaryResponse),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn get_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let result = state.inventory().summary().await;
    record_operation("summary", &result);
    Ok(Json(result?))
}

/// POST /summary/refresh - Rewrite the summary worksheet
#[utoipa::path(
    post,
    path = "/summary/refresh",
    tag = "Summary",
    responses(
        (status = 200, description = "Summary worksheet rewritten", body = OperationReport),
        (status = 404, description = "Summary worksheet missing", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn refresh_summary(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let result = state.inventory().refresh_summary_sheet().await;
    record_operation("refresh_summary_sheet", &result);
    Ok(Json(result?))
}

/// POST /schema/sync - Add missing intention columns to group worksheets
#[utoipa::path(
    post,
    path = "/schema/sync",
    tag = "Summary",
    responses(
        (status = 200, description = "Columns synced", body = OperationReport),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn sync_schema(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let result = state.inventory().sync_schema().await;
    record_operation("sync_schema", &result);
    Ok(Json(result?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/summary/refresh", post(refresh_summary))
        .route("/schema/sync", post(sync_schema))
}
