//! Job registry: submission, status lookup, cancellation, result retrieval.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use tracing::{error, info};
use uuid::Uuid;

use pdflingo_core::Translator;

use crate::runner::{run_job, DEFAULT_CHUNK_SIZE_PAGES};
use crate::state::{JobHandle, JobState, JobStatus};

/// Outcome of asking for a job's translated document.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed; the translated document bytes.
    Ready(Vec<u8>),
    /// Job exists but has not reached a terminal state yet.
    NotReady,
    /// Job ended without producing output.
    Failed(String),
    NotFound,
}

/// Outcome of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Flag set; the runner stops at its next page boundary.
    Requested,
    /// The job had already reached the given terminal state; nothing to do.
    AlreadyFinished(JobStatus),
    NotFound,
}

/// Owns all live jobs and the translator they share.
///
/// Each submission runs on its own worker thread; the service itself never
/// blocks on job execution. Handles stay registered after completion so
/// results can be fetched later: jobs live as long as the process, which is
/// sized for an interactive upload-poll-download session. A deployment
/// keeping the server up for weeks wants an age-based sweep on top.
pub struct TranslationService {
    jobs: RwLock<HashMap<String, Arc<JobHandle>>>,
    translator: Arc<dyn Translator>,
    chunk_size_pages: u32,
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::with_chunk_size(translator, DEFAULT_CHUNK_SIZE_PAGES)
    }

    pub fn with_chunk_size(translator: Arc<dyn Translator>, chunk_size_pages: u32) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            translator,
            chunk_size_pages,
        }
    }

    /// Start a translation job and return its id.
    ///
    /// The returned id is immediately valid for [`status`](Self::status)
    /// queries; execution proceeds on a background thread. `chunk_size`
    /// overrides the service default for this one job.
    pub fn submit(
        &self,
        document_name: String,
        pdf_bytes: Vec<u8>,
        source_lang: String,
        target_lang: String,
        chunk_size: Option<u32>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(JobHandle::new(
            id.clone(),
            document_name,
            source_lang,
            target_lang,
        ));

        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), Arc::clone(&handle));

        info!(job_id = %id, "job submitted");

        let translator = Arc::clone(&self.translator);
        let chunk_size = chunk_size.unwrap_or(self.chunk_size_pages);
        let worker = Arc::clone(&handle);
        let spawn = std::thread::Builder::new()
            .name(format!("pdflingo-job-{}", id))
            .spawn(move || {
                let result = catch_unwind(AssertUnwindSafe(|| {
                    run_job(&pdf_bytes, chunk_size, &worker, translator.as_ref());
                }));
                if result.is_err() {
                    error!("job worker panicked");
                    worker.fail("internal error: worker panicked");
                }
            });
        if let Err(e) = spawn {
            error!(job_id = %id, "failed to spawn job worker: {}", e);
            handle.fail("internal error: could not start worker");
        }

        id
    }

    pub fn status(&self, id: &str) -> Option<JobState> {
        self.handle(id).map(|h| h.snapshot())
    }

    /// Request cancellation.
    ///
    /// The request takes effect at the job's next page boundary. A job that
    /// already reached a terminal state reports [`CancelOutcome::AlreadyFinished`]
    /// instead of pretending the request had an effect.
    pub fn cancel(&self, id: &str) -> CancelOutcome {
        let Some(handle) = self.handle(id) else {
            return CancelOutcome::NotFound;
        };
        let status = handle.snapshot().status;
        if status.is_terminal() {
            return CancelOutcome::AlreadyFinished(status);
        }
        handle.request_cancel();
        CancelOutcome::Requested
    }

    pub fn result(&self, id: &str) -> JobResult {
        let Some(handle) = self.handle(id) else {
            return JobResult::NotFound;
        };
        let state = handle.snapshot();
        match state.status {
            JobStatus::Completed => match handle.output() {
                Some(bytes) => JobResult::Ready(bytes),
                None => JobResult::Failed("output missing".to_string()),
            },
            JobStatus::Pending | JobStatus::Processing => JobResult::NotReady,
            JobStatus::Error | JobStatus::Cancelled => JobResult::Failed(state.status_message),
        }
    }

    fn handle(&self, id: &str) -> Option<Arc<JobHandle>> {
        self.jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }
}
