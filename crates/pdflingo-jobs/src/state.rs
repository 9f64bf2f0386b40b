//! Job lifecycle state shared between the runner and status readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a translation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Cancelled,
}

impl JobStatus {
    /// Terminal states are never mutated again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Error | JobStatus::Cancelled
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error => write!(f, "error"),
            JobStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Snapshot of a job's progress, cloned out to status readers.
///
/// Readers get a consistent copy of whatever the runner last wrote; no
/// multi-field atomicity is promised across successive reads.
#[derive(Debug, Clone, Serialize)]
pub struct JobState {
    pub id: String,
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
    /// Name of the produced artifact; set only when the job completes.
    pub output_location: Option<String>,
}

/// Shared handle to one job: cancellation flag, state snapshot, output.
///
/// All fields except the cancellation flag are writer-exclusive to the
/// runner; `request_cancel` is the single mutation an external actor may
/// perform concurrently.
pub struct JobHandle {
    cancel: AtomicBool,
    state: RwLock<JobState>,
    output: Mutex<Option<Vec<u8>>>,
}

impl JobHandle {
    pub fn new(id: String, document_name: String, source_lang: String, target_lang: String) -> Self {
        Self {
            cancel: AtomicBool::new(false),
            state: RwLock::new(JobState {
                id,
                document_name,
                status: JobStatus::Pending,
                source_lang,
                target_lang,
                total_pages: 0,
                total_chunks: 0,
                current_page: 0,
                current_chunk: 0,
                progress_percent: 0,
                status_message: String::new(),
                warnings: Vec::new(),
                created_at: Utc::now(),
                completed_at: None,
                output_location: None,
            }),
            output: Mutex::new(None),
        }
    }

    pub fn snapshot(&self) -> JobState {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Flag the job for cancellation. Observed at the next page boundary.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Translated document bytes, available once the job completed.
    pub fn output(&self) -> Option<Vec<u8>> {
        self.output
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn mutate(&self, f: impl FnOnce(&mut JobState)) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.status.is_terminal() {
            return;
        }
        f(&mut state);
    }

    pub(crate) fn start(&self, total_pages: u32, total_chunks: u32) {
        self.mutate(|s| {
            s.status = JobStatus::Processing;
            s.total_pages = total_pages;
            s.total_chunks = total_chunks;
            s.status_message = format!("document with {} pages detected", total_pages);
        });
    }

    pub(crate) fn begin_chunk(&self, chunk: u32, first_page: u32, last_page: u32) {
        self.mutate(|s| {
            s.current_chunk = chunk;
            s.status_message = format!(
                "processing pages {}-{} (part {}/{})",
                first_page, last_page, chunk, s.total_chunks
            );
        });
    }

    /// Record a finished page. Progress never goes backwards and stays
    /// below 100 until `complete` publishes the output: a reader must never
    /// see 100 % alongside a non-terminal status.
    pub(crate) fn page_done(&self, page: u32) {
        self.mutate(|s| {
            s.current_page = s.current_page.max(page);
            if s.total_pages > 0 {
                let percent =
                    ((s.current_page as f64 / s.total_pages as f64) * 100.0).round() as u8;
                s.progress_percent = s.progress_percent.max(percent.min(99));
            }
            s.status_message = format!(
                "page {} of {}, chunk {} of {}",
                s.current_page, s.total_pages, s.current_chunk, s.total_chunks
            );
        });
    }

    /// Record a warning, once per distinct cause.
    pub(crate) fn warn(&self, cause: &str) {
        self.mutate(|s| {
            if !s.warnings.iter().any(|w| w == cause) {
                tracing::warn!(job_id = %s.id, "{}", cause);
                s.warnings.push(cause.to_string());
            }
        });
    }

    pub(crate) fn complete(&self, output: Vec<u8>, message: &str) {
        *self.output.lock().unwrap_or_else(|e| e.into_inner()) = Some(output);
        self.mutate(|s| {
            s.status = JobStatus::Completed;
            s.progress_percent = 100;
            s.current_page = s.total_pages;
            s.current_chunk = s.total_chunks;
            s.completed_at = Some(Utc::now());
            s.status_message = message.to_string();
            let stem = s
                .document_name
                .strip_suffix(".pdf")
                .unwrap_or(&s.document_name);
            s.output_location = Some(format!("{}_{}.pdf", stem, s.target_lang));
        });
    }

    pub(crate) fn fail(&self, message: &str) {
        self.mutate(|s| {
            tracing::error!(job_id = %s.id, "job failed: {}", message);
            s.status = JobStatus::Error;
            s.completed_at = Some(Utc::now());
            s.status_message = format!("failed: {}", message);
        });
    }

    pub(crate) fn cancelled(&self) {
        self.mutate(|s| {
            tracing::info!(job_id = %s.id, "job cancelled");
            s.status = JobStatus::Cancelled;
            s.completed_at = Some(Utc::now());
            s.status_message = "cancelled by user".to_string();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn handle() -> JobHandle {
        JobHandle::new(
            "job-1".into(),
            "doc.pdf".into(),
            "en".into(),
            "es".into(),
        )
    }

    #[test]
    fn test_new_job_is_pending() {
        let h = handle();
        let s = h.snapshot();
        assert_eq!(s.status, JobStatus::Pending);
        assert_eq!(s.progress_percent, 0);
        assert!(s.output_location.is_none());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let h = handle();
        h.start(10, 1);
        h.page_done(5);
        assert_eq!(h.snapshot().progress_percent, 50);
        // A stale page number cannot move progress backwards.
        h.page_done(3);
        let s = h.snapshot();
        assert_eq!(s.current_page, 5);
        assert_eq!(s.progress_percent, 50);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let h = handle();
        h.start(10, 1);
        h.complete(vec![1, 2, 3], "done");
        h.page_done(99);
        h.fail("should be ignored");
        let s = h.snapshot();
        assert_eq!(s.status, JobStatus::Completed);
        assert_eq!(s.progress_percent, 100);
        assert_eq!(s.output_location.as_deref(), Some("doc_es.pdf"));
    }

    #[test]
    fn test_progress_reaches_100_only_when_completed() {
        let h = handle();
        h.start(3, 2);
        h.page_done(1);
        h.page_done(2);
        h.page_done(3);
        let s = h.snapshot();
        assert_eq!(s.status, JobStatus::Processing);
        assert_eq!(s.current_page, 3);
        assert_eq!(s.progress_percent, 99);

        h.complete(vec![1], "done");
        let s = h.snapshot();
        assert_eq!(s.status, JobStatus::Completed);
        assert_eq!(s.progress_percent, 100);
    }

    #[test]
    fn test_warnings_deduplicate_by_cause() {
        let h = handle();
        h.start(2, 1);
        h.warn("translation failed: engine down");
        h.warn("translation failed: engine down");
        h.warn("page 2 cannot be read");
        assert_eq!(h.snapshot().warnings.len(), 2);
    }

    #[test]
    fn test_cancel_flag_round_trip() {
        let h = handle();
        assert!(!h.cancel_requested());
        h.request_cancel();
        assert!(h.cancel_requested());
    }
}
