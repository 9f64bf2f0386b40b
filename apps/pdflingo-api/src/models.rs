//! Request and response models for the translation API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pdflingo_jobs::{JobState, JobStatus};

/// Request to start a translation job
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTranslationRequest {
    pub document_name: String,
    pub pdf_base64: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(default)]
    pub chunk_size_pages: Option<u32>,
}

/// Response to a successful submission
#[derive(Debug, Clone, Serialize)]
pub struct CreateTranslationResponse {
    pub job_id: String,
    pub document_hash: String,
    pub status: JobStatus,
}

/// Job progress as reported to polling clients
#[derive(Debug, Clone, Serialize)]
pub struct TranslationStatusResponse {
    pub job_id: String,
    pub document_name: String,
    pub status: JobStatus,
    pub source_lang: String,
    pub target_lang: String,
    pub total_pages: u32,
    pub total_chunks: u32,
    pub current_page: u32,
    pub current_chunk: u32,
    pub progress_percent: u8,
    pub status_message: String,
    pub warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub output_location: Option<String>,
}

impl From<JobState> for TranslationStatusResponse {
    fn from(state: JobState) -> Self {
        Self {
            job_id: state.id,
            document_name: state.document_name,
            status: state.status,
            source_lang: state.source_lang,
            target_lang: state.target_lang,
            total_pages: state.total_pages,
            total_chunks: state.total_chunks,
            current_page: state.current_page,
            current_chunk: state.current_chunk,
            progress_percent: state.progress_percent,
            status_message: state.status_message,
            warnings: state.warnings,
            created_at: state.created_at,
            completed_at: state.completed_at,
            output_location: state.output_location,
        }
    }
}

/// Response to a cancellation request
#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub cancel_requested: bool,
    pub status: JobStatus,
}
