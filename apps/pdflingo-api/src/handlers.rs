//! HTTP handlers for the translation API

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use pdflingo_jobs::{CancelOutcome, JobResult};

use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// Start a new translation job
pub async fn create_translation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTranslationRequest>,
) -> Result<Json<CreateTranslationResponse>, ApiError> {
    if req.document_name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Missing document name".into()));
    }
    if req.source_lang.trim().is_empty() || req.target_lang.trim().is_empty() {
        return Err(ApiError::InvalidRequest("Missing language pair".into()));
    }

    let pdf_data = BASE64
        .decode(&req.pdf_base64)
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid PDF base64: {}", e)))?;
    if pdf_data.is_empty() {
        return Err(ApiError::InvalidRequest("Empty document".into()));
    }

    let document_hash = hex::encode(Sha256::digest(&pdf_data));

    let job_id = state.service.submit(
        req.document_name,
        pdf_data,
        req.source_lang,
        req.target_lang,
        req.chunk_size_pages,
    );

    tracing::info!("Created translation job: {}", job_id);

    let status = state
        .service
        .status(&job_id)
        .ok_or_else(|| ApiError::JobNotFound(job_id.clone()))?;

    Ok(Json(CreateTranslationResponse {
        job_id,
        document_hash,
        status: status.status,
    }))
}

/// Get job status by ID
pub async fn get_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TranslationStatusResponse>, ApiError> {
    let job = state
        .service
        .status(&id)
        .ok_or_else(|| ApiError::JobNotFound(id))?;

    Ok(Json(job.into()))
}

/// Request cancellation of a running job
pub async fn cancel_translation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    match state.service.cancel(&id) {
        CancelOutcome::Requested => {
            tracing::info!("Cancellation requested for job: {}", id);
            let job = state
                .service
                .status(&id)
                .ok_or_else(|| ApiError::JobNotFound(id.clone()))?;
            Ok(Json(CancelResponse {
                job_id: id,
                cancel_requested: true,
                status: job.status,
            }))
        }
        CancelOutcome::AlreadyFinished(status) => Ok(Json(CancelResponse {
            job_id: id,
            cancel_requested: false,
            status,
        })),
        CancelOutcome::NotFound => Err(ApiError::JobNotFound(id)),
    }
}

/// Download the translated document of a completed job
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ApiError> {
    let bytes = match state.service.result(&id) {
        JobResult::Ready(bytes) => bytes,
        JobResult::NotReady => return Err(ApiError::OutputNotReady),
        JobResult::Failed(msg) => return Err(ApiError::JobUnsuccessful(msg)),
        JobResult::NotFound => return Err(ApiError::JobNotFound(id)),
    };

    let filename = state
        .service
        .status(&id)
        .and_then(|s| s.output_location)
        .unwrap_or_else(|| format!("{}.pdf", id));

    Ok((
        StatusCode::OK,
        [
            ("Content-Type".to_string(), "application/pdf".to_string()),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    ))
}
