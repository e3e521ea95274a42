//! Error Types for the Armory API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use armory_core::{ConfigError, LedgerError, StorageError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing or blank
    MissingField,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Worksheet does not exist in the spreadsheet
    WorksheetNotFound,

    /// Item type is not a column of the worksheet
    ColumnNotFound,

    /// No row with that full name in the group worksheet
    PersonNotFound,

    /// Serial is not at the expected location
    SerialNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Serial already present under that item type
    DuplicateSerial,

    /// Person already holds an item of that type
    AlreadyAssigned,

    /// Person already has a row in the group worksheet
    AlreadyEnrolled,

    /// Operation conflicts with what the ledger records
    StateConflict,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// The spreadsheet service call failed
    StoreUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::MissingField => StatusCode::BAD_REQUEST,

            ErrorCode::WorksheetNotFound
            | ErrorCode::ColumnNotFound
            | ErrorCode::PersonNotFound
            | ErrorCode::SerialNotFound => StatusCode::NOT_FOUND,

            ErrorCode::DuplicateSerial
            | ErrorCode::AlreadyAssigned
            | ErrorCode::AlreadyEnrolled
            | ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::WorksheetNotFound => "Worksheet not found",
            ErrorCode::ColumnNotFound => "Item type not found",
            ErrorCode::PersonNotFound => "Person not found",
            ErrorCode::SerialNotFound => "Serial not found",
            ErrorCode::DuplicateSerial => "Serial already exists",
            ErrorCode::AlreadyAssigned => "Item type already assigned",
            ErrorCode::AlreadyEnrolled => "Person already enrolled",
            ErrorCode::StateConflict => "Operation conflicts with current state",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StoreUnavailable => "Ledger store unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn worksheet_not_found(worksheet: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::WorksheetNotFound,
            format!("Worksheet {} not found", worksheet),
        )
    }

    pub fn column_not_found(worksheet: impl fmt::Display, type_name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ColumnNotFound,
            format!("Item type {} not found in {}", type_name, worksheet),
        )
    }

    pub fn person_not_found(group: impl fmt::Display, full_name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::PersonNotFound,
            format!("{} not found in group {}", full_name, group),
        )
    }

    pub fn serial_not_found(
        worksheet: impl fmt::Display,
        type_name: impl fmt::Display,
        serial: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorCode::SerialNotFound,
            format!("{} {} not found in {}", type_name, serial, worksheet),
        )
    }

    pub fn duplicate_serial(
        worksheet: impl fmt::Display,
        type_name: impl fmt::Display,
        serial: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorCode::DuplicateSerial,
            format!("{} {} already exists in {}", type_name, serial, worksheet),
        )
    }

    pub fn already_assigned(
        full_name: impl fmt::Display,
        type_name: impl fmt::Display,
        existing: impl fmt::Display,
    ) -> Self {
        Self::new(
            ErrorCode::AlreadyAssigned,
            format!("{} already holds {} {}", full_name, type_name, existing),
        )
    }

    pub fn already_enrolled(group: impl fmt::Display, full_name: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::AlreadyEnrolled,
            format!("{} is already listed in group {}", full_name, group),
        )
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StoreUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM LEDGER AND STANDARD ERRORS
// ============================================================================

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::WorksheetNotFound { worksheet } => ApiError::worksheet_not_found(worksheet),
            StorageError::AlreadyExists { worksheet } => {
                ApiError::state_conflict(format!("Worksheet {} already exists", worksheet))
            }
            StorageError::StoreUnavailable { operation, reason } => {
                tracing::error!(operation = %operation, reason = %reason, "Ledger store unavailable");
                ApiError::store_unavailable(format!("Ledger store unavailable during {}", operation))
            }
            other => {
                tracing::error!("Ledger storage error: {}", other);
                ApiError::internal_error(other.to_string())
            }
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Storage(e) => e.into(),
            LedgerError::ColumnNotFound { worksheet, column } => {
                ApiError::column_not_found(worksheet, column)
            }
            LedgerError::MissingNameColumn { worksheet, column } => {
                tracing::error!(worksheet = %worksheet, column = %column, "Group worksheet has no name column");
                ApiError::internal_error(format!("Worksheet {} has no '{}' column", worksheet, column))
            }
            LedgerError::Config(e) => ApiError::from(e),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::internal_error(err.to_string())
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Convert from reqwest::Error to ApiError.
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Sheets transport error: {:?}", err);
        ApiError::store_unavailable(format!("Spreadsheet request failed: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
