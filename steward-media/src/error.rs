use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors a `ContentStore` or `MediaUploader` can raise, already split
/// along the retry/no-retry line: transient failures are retried by the
/// JobRunner with backoff, permanent failures abort the job immediately.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("media not found: {id}")]
    NotFound { id: String },

    #[error("transient upload error: {reason}")]
    Transient { reason: String },

    #[error("permanent upload error: {reason}")]
    Permanent { reason: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl MediaError {
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn transient<S: Into<String>>(reason: S) -> Self {
        Self::Transient {
            reason: reason.into(),
        }
    }

    pub fn permanent<S: Into<String>>(reason: S) -> Self {
        Self::Permanent {
            reason: reason.into(),
        }
    }

    /// True when the JobRunner should retry the upload with backoff rather
    /// than failing the job outright.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MediaError::Transient { .. } | MediaError::Io { .. })
    }
}
