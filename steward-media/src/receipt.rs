use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MediaId;

/// Receipt returned after a successful upload. JobRunner appends these ids
/// into a Job's `uploadedIds[]`, the per-job resumability ledger, so the
/// Upload step can skip images that already succeeded on a prior attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaReceipt {
    pub id: MediaId,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MediaReceipt {
    pub fn new(id: MediaId, size_bytes: u64, content_type: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            size_bytes,
            content_type,
            created_at,
        }
    }
}
