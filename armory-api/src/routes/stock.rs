//! Stock REST Routes
//!
//! Adds new serials to the weapon and intention stock worksheets.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::record_operation,
    types::{AddIntentionRequest, AddWeaponRequest, OperationReport},
};

/// POST /weapon-types - Add a weapon serial to weapon stock
#[utoipa::path(
    post,
    path = "/weapon-types",
    tag = "Stock",
    request_body = AddWeaponRequest,
    responses(
        (status = 201, description = "Serial added to weapon stock", body = OperationReport),
        (status = 400, description = "Blank weapon type or serial", body = ApiError),
        (status = 409, description = "Serial already in that column", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn add_weapon(
    State(state): State<AppState>,
    Json(req): Json<AddWeaponRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .add_weapon(&req.weapon_name, &req.serial_number)
        .await;
    record_operation("add_weapon", &result);
    Ok((StatusCode::CREATED, Json(result?)))
}

/// POST /intention-types - Add an intention serial and sync group columns
#[utoipa::path(
    post,
    path = "/intention-types",
    tag = "Stock",
    request_body = AddIntentionRequest,
    responses(
        (status = 201, description = "Serial added to intention stock", body = OperationReport),
        (status = 400, description = "Blank intention type or serial", body = ApiError),
        (status = 409, description = "Serial already in that column", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn add_intention(
    State(state): State<AppState>,
    Json(req): Json<AddIntentionRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .add_intention(&req.intention_type, &req.serial_number)
        .await;
    record_operation("add_intention", &result);
    Ok((StatusCode::CREATED, Json(result?)))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/weapon-types", post(add_weapon))
        .route("/intention-types", post(add_intention))
}
