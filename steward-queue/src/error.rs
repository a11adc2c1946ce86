use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

/// Infrastructure errors surfaced by [`crate::store::JobStore`] and
/// [`crate::controller::QueueController`]. Failures inside job execution
/// itself travel through [`steward_chain::SubmitError`] instead — this
/// enum is for the queue's own bookkeeping.
#[derive(Error, Debug, Clone)]
pub enum QueueError {
    #[error("job not found: {0}")]
    NotFound(String),

    #[error("job {existing} already exists for this (user, clientOpId) pair")]
    DuplicateClientOpId { existing: String },

    #[error("user already has a job in processing")]
    AlreadyProcessing,

    #[error("job {0} is not eligible to run yet")]
    NotEligible(String),

    #[error("job {0} is already in a terminal state")]
    AlreadyTerminal(String),

    #[error("could not acquire the cross-tab lease for this user")]
    LeaseUnavailable,

    #[error("internal error: {0}")]
    Internal(String),
}
