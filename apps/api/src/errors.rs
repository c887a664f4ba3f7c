#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The failure taxonomy follows the pipeline's containment rules: extraction
/// and structuring failures degrade a single document and are handled before
/// they ever reach a handler; the variants here are the ones that must surface
/// to a caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Document extraction failed: {0}")]
    Extraction(#[from] crate::extraction::ExtractionFailure),

    #[error("Match engine error: {0}")]
    MatchEngine(#[from] crate::matching::MatchEngineError),

    #[error("An analysis run is already in progress")]
    AnalysisInProgress,

    #[error("Analysis run exceeded the configured deadline")]
    RunTimeout,

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A blob storage error occurred".to_string(),
                )
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction failure: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILURE",
                    e.to_string(),
                )
            }
            AppError::MatchEngine(e) => {
                tracing::error!("Match engine error, run aborted: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MATCH_ENGINE_ERROR",
                    "The match engine failed; the run was aborted".to_string(),
                )
            }
            AppError::AnalysisInProgress => (
                StatusCode::CONFLICT,
                "ANALYSIS_IN_PROGRESS",
                "An analysis run is already in progress".to_string(),
            ),
            AppError::RunTimeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "RUN_TIMEOUT",
                "The analysis run timed out; no result was persisted".to_string(),
            ),
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
