use thiserror::Error;

/// Result type for submission operations.
pub type SubmitResult<T> = Result<T, SubmitError>;

/// The error taxonomy a `Submitter` and `Encoder` raise. JobRunner matches
/// on these variants directly to decide the next `Job` status — nothing
/// downstream re-derives retryability from a string.
#[derive(Error, Debug, Clone)]
pub enum SubmitError {
    /// Signer rejection ("user rejected/denied/cancelled"). Terminal, not
    /// surfaced as an error toast.
    #[error("submission cancelled by signer")]
    Cancelled,

    /// Simulation reverted with a known, named contract error.
    #[error("known contract revert: {reason}")]
    KnownContractRevert { reason: String },

    /// On-chain receipt came back with a reverted status and no known
    /// classification.
    #[error("transaction reverted")]
    UnknownRevert,

    /// Network/timeout/gas/nonce/upload-transient. Eligible for retry with
    /// backoff.
    #[error("transient submission error: {reason}")]
    Transient { reason: String },

    /// Encode error, unreachable precondition, or any other failure that
    /// retrying cannot fix.
    #[error("permanent submission error: {reason}")]
    Permanent { reason: String },
}

impl SubmitError {
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

    pub fn known_revert<S: Into<String>>(reason: S) -> Self {
        Self::KnownContractRevert {
            reason: reason.into(),
        }
    }

    /// Classify a wallet/bundler error message the way both submitter
    /// variants must: rejection phrases are `Cancelled`, "insufficient
    /// funds"/nonce/network phrases are `Transient`, everything else is
    /// `Permanent`.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("rejected") || lower.contains("denied") || lower.contains("cancelled") {
            return Self::Cancelled;
        }
        if lower.contains("insufficient funds") || lower.contains("nonce") || lower.contains("network") {
            return Self::transient(message.to_string());
        }
        Self::permanent(message.to_string())
    }

    /// Whether the JobRunner should retry this failure rather than marking
    /// the job `failed`.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
