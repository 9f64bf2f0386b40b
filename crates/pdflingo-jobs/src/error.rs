use pdflingo_core::CoreError;
use thiserror::Error;

/// Outcomes that end a job run early.
///
/// Block- and page-level problems never surface here; they are recorded as
/// warnings and the run continues. Only document-level failures and
/// cancellation abort a job.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("cancelled by user")]
    Cancelled,

    #[error(transparent)]
    Fatal(#[from] CoreError),
}
