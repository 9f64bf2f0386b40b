//! Chunked translation job execution.
//!
//! Builds on `pdflingo-core` to run whole-document translation jobs:
//! pages are processed in fixed-size chunks with progress snapshots,
//! deduplicated warnings, and cancellation observed at page boundaries.

pub mod error;
pub mod runner;
pub mod service;
pub mod state;

pub use error::JobError;
pub use runner::{run_job, DEFAULT_CHUNK_SIZE_PAGES};
pub use service::{CancelOutcome, JobResult, TranslationService};
pub use state::{JobHandle, JobState, JobStatus};
