use chrono::{DateTime, Utc};
use steward_chain::TxId;
use steward_queue::JobId;

/// Where a `MergeItem` came from: an indexer-confirmed attestation, or a
/// local job still working its way through the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOrigin {
    /// Confirmed on-chain and visible through the indexer.
    Confirmed,
    /// Locally `succeeded` but not yet echoed back by the indexer — the
    /// tx_id is real, just not indexed yet.
    RecentlySubmitted { job_id: JobId },
    /// Still `pending`/`processing` locally; no real tx_id exists yet.
    Queued { job_id: JobId },
}

/// A single row in a MergeView listing: one resource submission, whichever
/// source currently has the authoritative view of it.
#[derive(Debug, Clone)]
pub struct MergeItem {
    pub resource_id: String,
    pub tx_id: TxId,
    pub client_op_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub origin: MergeOrigin,
}
