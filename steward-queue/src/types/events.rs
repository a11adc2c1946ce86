use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_chain::TxId;

use super::JobId;

/// The event vocabulary the EventBus carries. Each event names the job it
/// concerns; `QueueSyncStarted`/`QueueSyncCompleted` are the only pair not
/// scoped to a single job, emitted around a flush of a user's whole queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QueueEvent {
    JobAdded { job_id: JobId, at: DateTime<Utc> },
    JobProcessing { job_id: JobId, at: DateTime<Utc> },
    JobCompleted { job_id: JobId, tx_id: TxId, at: DateTime<Utc> },
    JobFailed { job_id: JobId, error: String, at: DateTime<Utc> },
    JobSkipped { job_id: JobId, reason: String, at: DateTime<Utc> },
    QueueSyncStarted { user_address: String, at: DateTime<Utc> },
    QueueSyncCompleted { user_address: String, at: DateTime<Utc> },
}

impl QueueEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JobAdded { .. } => "job_added",
            Self::JobProcessing { .. } => "job_processing",
            Self::JobCompleted { .. } => "job_completed",
            Self::JobFailed { .. } => "job_failed",
            Self::JobSkipped { .. } => "job_skipped",
            Self::QueueSyncStarted { .. } => "queue_sync_started",
            Self::QueueSyncCompleted { .. } => "queue_sync_completed",
        }
    }

    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::JobAdded { job_id, .. }
            | Self::JobProcessing { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::JobSkipped { job_id, .. } => Some(job_id),
            Self::QueueSyncStarted { .. } | Self::QueueSyncCompleted { .. } => None,
        }
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::JobAdded { at, .. }
            | Self::JobProcessing { at, .. }
            | Self::JobCompleted { at, .. }
            | Self::JobFailed { at, .. }
            | Self::JobSkipped { at, .. }
            | Self::QueueSyncStarted { at, .. }
            | Self::QueueSyncCompleted { at, .. } => at,
        }
    }
}
