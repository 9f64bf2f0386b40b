//! Error types for the translation API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Job still running")]
    OutputNotReady,

    #[error("Job produced no output: {0}")]
    JobUnsuccessful(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::JobNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Job not found: {}", id))
            }
            ApiError::OutputNotReady => (
                StatusCode::CONFLICT,
                "Job has not finished yet".to_string(),
            ),
            ApiError::JobUnsuccessful(msg) => (StatusCode::GONE, msg.clone()),
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
