//! HTTP request handlers for the publication API.
//!
//! This module contains the handler functions for all API endpoints.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::families::{FamilyInput, build_family};
use crate::models::PublicationFamily;
use crate::pipeline::{ENGINE_VERSION, InMemorySource, run_publication};

use super::request::PublicationRequest;
use super::response::{ApiError, ApiErrorResponse, PublicationResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/publications", post(run_handler))
        .route("/publications/:family", post(family_handler))
        .with_state(state)
}

/// Maps a body extraction failure to a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );

            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };

    ApiErrorResponse {
        status: StatusCode::BAD_REQUEST,
        error,
    }
    .into_response()
}

/// Handler for POST /publications/:family.
///
/// Builds one publication family from the records in the request body.
async fn family_handler(
    State(state): State<AppState>,
    Path(family): Path<String>,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, family = %family, "Processing publication request");

    let family = match family.parse::<PublicationFamily>() {
        Ok(family) => family,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Unknown publication family");
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let input = FamilyInput {
        records: &request.records,
        latest_orgs: &request.latest_orgs,
        publication_date: request.publication_date_or(state.config().month_date()),
    };

    match build_family(family, input) {
        Ok(output) => {
            info!(
                correlation_id = %correlation_id,
                family = %family,
                records = request.records.len(),
                tables = output.tables.len(),
                duration_us = output.trace.duration_us,
                "Publication completed successfully"
            );

            let response = PublicationResponse {
                publication_id: correlation_id,
                timestamp: Utc::now(),
                engine_version: ENGINE_VERSION.to_string(),
                family: output.family,
                tables: output.tables,
                trace: output.trace,
            };
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(response),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Publication failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}

/// Handler for POST /publications.
///
/// Runs every family over the records in the request body.
async fn run_handler(
    State(state): State<AppState>,
    payload: Result<Json<PublicationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing publication run request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let mut config = state.config().config().clone();
    config.month_date = request.publication_date_or(config.month_date);
    let source = InMemorySource::new(request.records, request.latest_orgs);

    match run_publication(&config, &source) {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                run_id = %run.run_id,
                families = run.outputs.len(),
                duration_us = run.duration_us,
                "Publication run completed successfully"
            );
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                Json(run),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Publication run failed"
            );
            ApiErrorResponse::from(err).into_response()
        }
    }
}
