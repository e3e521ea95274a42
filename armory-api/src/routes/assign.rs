//! Assignment REST Routes
//!
//! Issue and return items to people enrolled in group worksheets.

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    telemetry::record_operation,
    types::{AssignWeaponRequest, IntentionAssignmentRequest, OperationReport, ReturnAllRequest},
};

/// POST /assign-weapon - Enroll a person with a weapon from stock
#[utoipa::path(
    post,
    path = "/assign-weapon",
    tag = "Assignment",
    request_body = AssignWeaponRequest,
    responses(
        (status = 200, description = "Person enrolled", body = OperationReport),
        (status = 400, description = "Blank field or unknown group", body = ApiError),
        (status = 404, description = "Serial not in stock", body = ApiError),
        (status = 409, description = "Person already enrolled in the group", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn assign_weapon(
    State(state): State<AppState>,
    Json(req): Json<AssignWeaponRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .assign_weapon(
            &req.full_name,
            &req.group,
            &req.item_name,
            &req.serial_number,
            req.intention_type.as_deref(),
        )
        .await;
    record_operation("assign_weapon", &result);
    Ok(Json(result?))
}

/// POST /assign-intention - Issue an intention serial to an enrolled person
#[utoipa::path(
    post,
    path = "/assign-intention",
    tag = "Assignment",
    request_body = IntentionAssignmentRequest,
    responses(
        (status = 200, description = "Intention issued", body = OperationReport),
        (status = 400, description = "Blank field or unknown group", body = ApiError),
        (status = 404, description = "Person, column or serial not found", body = ApiError),
        (status = 409, description = "Person already holds that type", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn assign_intention(
    State(state): State<AppState>,
    Json(req): Json<IntentionAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .assign_intention(&req.full_name, &req.group, &req.intention_type, &req.serial_number)
        .await;
    record_operation("assign_intention", &result);
    Ok(Json(result?))
}

/// POST /return-intention - Return one intention serial to stock
#[utoipa::path(
    post,
    path = "/return-intention",
    tag = "Assignment",
    request_body = IntentionAssignmentRequest,
    responses(
        (status = 200, description = "Intention returned", body = OperationReport),
        (status = 400, description = "Blank field or unknown group", body = ApiError),
        (status = 404, description = "Person or column not found", body = ApiError),
        (status = 409, description = "Serial on record differs", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn return_intention(
    State(state): State<AppState>,
    Json(req): Json<IntentionAssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state
        .inventory()
        .return_intention(&req.full_name, &req.group, &req.intention_type, &req.serial_number)
        .await;
    record_operation("return_intention", &result);
    Ok(Json(result?))
}

/// POST /return-all - Return everything a person holds and remove their row
#[utoipa::path(
    post,
    path = "/return-all",
    tag = "Assignment",
    request_body = ReturnAllRequest,
    responses(
        (status = 200, description = "Items returned", body = OperationReport),
        (status = 400, description = "Blank field or unknown group", body = ApiError),
        (status = 404, description = "Person not found", body = ApiError),
        (status = 503, description = "Ledger store unavailable", body = ApiError),
    ),
)]
pub async fn return_all(
    State(state): State<AppState>,
    Json(req): Json<ReturnAllRequest>,
) -> ApiResult<impl IntoResponse> {
    let result = state.inventory().return_all(&req.full_name, &req.group).await;
    record_operation("return_all", &result);
    Ok(Json(result?))
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/assign-weapon", post(assign_weapon))
        .route("/assign-intention", post(assign_intention))
        .route("/return-intention", post(return_intention))
        .route("/return-all", post(return_all))
}
