//! OpenAPI Specification for the Armory API
//!
//! Generated with utoipa from the request/response types and the route
//! annotations.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{assign, health, repair, stock, summary};
use crate::telemetry::metrics;
use crate::types::*;
use armory_core::{HealthCheck, HealthStatus};

/// OpenAPI document for the Armory API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Armory API",
        version = "0.1.0",
        description = "Armory inventory ledger: weapon and optic serials tracked across stock, repair and group worksheets"
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    tags(
        (name = "Stock", description = "Add serials to weapon and intention stock"),
        (name = "Assignment", description = "Issue and return items to people in groups"),
        (name = "Repair", description = "Move serials between stock and repair"),
        (name = "Summary", description = "Per-type counts and schema maintenance"),
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        stock::add_weapon,
        stock::add_intention,
        assign::assign_weapon,
        assign::assign_intention,
        assign::return_intention,
        assign::return_all,
        repair::send_item,
        repair::receive_item,
        summary::get_summary,
        summary::refresh_summary,
        summary::sync_schema,
        health::ping,
        health::liveness,
        health::readiness,
        metrics::metrics_handler,
    ),
    components(
        schemas(
            ApiError, ErrorCode,
            AddWeaponRequest, AddIntentionRequest, AssignWeaponRequest,
            IntentionAssignmentRequest, ReturnAllRequest, RepairItemRequest,
            OperationReport, SummaryResponse, SummarySection, SummaryRowResponse,
            health::HealthResponse, health::HealthDetails, HealthCheck, HealthStatus,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate OpenAPI spec as JSON string.
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() -> Result<(), String> {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Armory API");

        let tags = openapi
            .tags
            .as_ref()
            .ok_or_else(|| "OpenAPI tags missing".to_string())?;
        assert_eq!(tags.len(), 6);
        Ok(())
    }

    #[test]
    fn test_openapi_json_serialization() -> Result<(), String> {
        let json = ApiDoc::to_json().map_err(|e| format!("Failed to serialize OpenAPI: {}", e))?;
        serde_json::from_str::<serde_json::Value>(&json)
            .map_err(|e| format!("Generated JSON invalid: {}", e))?;
        assert!(json.contains("OperationReport"));
        Ok(())
    }

    #[test]
    fn test_openapi_paths_exist() {
        let paths = ApiDoc::openapi().paths.paths;
        for path in [
            "/weapon-types",
            "/intention-types",
            "/assign-weapon",
            "/assign-intention",
            "/return-intention",
            "/return-all",
            "/send-item",
            "/receive-item",
            "/summary",
            "/summary/refresh",
            "/schema/sync",
            "/health/ready",
            "/metrics",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }
}
