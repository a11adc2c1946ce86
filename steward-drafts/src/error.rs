use thiserror::Error;

pub type DraftResult<T> = Result<T, DraftError>;

/// Infrastructure errors surfaced by [`crate::store::DraftStore`].
#[derive(Error, Debug, Clone)]
pub enum DraftError {
    #[error("draft not found: {0}")]
    NotFound(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("a draft already exists for this (user, chain, resource, action) tuple: {0}")]
    DuplicateTarget(String),

    #[error("internal error: {0}")]
    Internal(String),
}
