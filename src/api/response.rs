//! Response types for the publication API.
//!
//! This module defines the success bodies, the error body and the mapping
//! from engine errors to HTTP statuses.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PublicationError;
use crate::models::{CompositionTrace, PublicationFamily, PublicationTable};

/// Response body of a single family build.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationResponse {
    /// Unique identifier of this build.
    pub publication_id: Uuid,
    /// When the build completed.
    pub timestamp: DateTime<Utc>,
    /// Version of the engine that produced the tables.
    pub engine_version: String,
    /// The family built.
    pub family: PublicationFamily,
    /// Published tables, in output order.
    pub tables: Vec<PublicationTable>,
    /// How every table was composed.
    pub trace: CompositionTrace,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an unknown family error response.
    pub fn unknown_family(family: &str) -> Self {
        Self::with_details(
            "UNKNOWN_FAMILY",
            format!("Publication family not found: {}", family),
            format!(
                "Expected one of: {}",
                PublicationFamily::ALL.map(|f| f.id()).join(", ")
            ),
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<PublicationError> for ApiErrorResponse {
    fn from(error: PublicationError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            PublicationError::ConfigNotFound { .. }
            | PublicationError::ConfigParseError { .. }
            | PublicationError::MissingConfigValue { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            PublicationError::EmptyGroupResult {
                breakdown,
                condition,
                ..
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "EMPTY_GROUP_RESULT",
                    message,
                    format!("No records satisfy '{}' for breakdown '{}'", condition, breakdown),
                ),
            ),
            PublicationError::DivisionUndefined { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("DIVISION_UNDEFINED", message),
            ),
            PublicationError::UnknownBreakdownValue { field, value } if field == "family" => {
                (StatusCode::NOT_FOUND, ApiError::unknown_family(&value))
            }
            PublicationError::UnknownBreakdownValue { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("UNKNOWN_BREAKDOWN_VALUE", message),
            ),
            PublicationError::RowNotFound { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("ROW_NOT_FOUND", message),
            ),
            PublicationError::SchemaMismatch { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("SCHEMA_MISMATCH", "Table assembly failed", message),
            ),
            PublicationError::SourceError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("SOURCE_ERROR", "Records could not be read", message),
            ),
            PublicationError::OutputError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("OUTPUT_ERROR", "Outputs could not be written", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}
