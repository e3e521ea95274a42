//! Repair REST Routes
//!
//! Move serials between stock and the repair worksheet. `/recieve-item` is
//! kept as an alias because deployed clients still post to it.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::record_operation,
    types::{OperationReport, RepairItemRequest},
};

/// POST /send-item - Move a serial from stock to repair
#[utoipa::path(
    post,
    path = "/send-item",
    tag = "Repair",
    request_body = RepairItemRequest,
    responses(
        (status = 200, description = "Serial moved to repair", body = OperationReport),
        (status = 400, description = "Blank item type or serial", body = ApiError),
        (status = 404, description = "Serial not in stock", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn send_item(
    State(state): State<AppState>,
    Json(req): Json<RepairItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .send_to_repair(req.is_weapon, &req.item_type, &req.serial_number)
        .await;
    record_operation("send_to_repair", &result);
    Ok(Json(result?))
}

/// POST /receive-item - Move a serial from repair back to stock
#[utoipa::path(
    post,
    path = "/receive-item",
    tag = "Repair",
    request_body = RepairItemRequest,
    responses(
        (status = 200, description = "Serial back in stock", body = OperationReport),
        (status = 400, description = "Blank item type or serial", body = ApiError),
        (status = 404, description = "Serial not in repair", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn receive_item(
    State(state): State<AppState>,
    Json(req): Json<RepairItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .receive_from_repair(req.is_weapon, &req.item_type, &req.serial_number)
        .await;
    record_operation("receive_from_repair", &result);
    Ok(Json(result?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/send-item", post(send_item))
        .route("/receive-item", post(receive_item))
        .route("/recieve-item", post(receive_item))
}
