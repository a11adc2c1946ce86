use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors MergeView surfaces. Wraps both of its upstream sources rather
/// than re-deriving their variants — callers that need the original
/// classification should match through to the inner error.
#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("indexer query failed: {0}")]
    Indexer(#[from] steward_chain::SubmitError),

    #[error("queue read failed: {0}")]
    Queue(#[from] steward_queue::QueueError),
}
