use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steward_chain::{JobPayload, TxId};
use steward_core::{ChainId, UserAddress};

use super::JobId;

/// Job status lifecycle. Exactly the five states the submission core
/// distinguishes — a transient failure returns to `Pending` rather than a
/// separate "retrying" state, since `nextEligibleAt` already carries that
/// information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Skipped,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Skipped)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// A durable unit of work. See the module's invariants: `(userAddress,
/// clientOpId)` is unique, `attempts` only increases, a `succeeded` job
/// always carries a `txId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub user_address: UserAddress,
    pub chain_id: ChainId,
    pub payload: JobPayload,
    pub client_op_id: String,
    pub status: JobStatus,
    pub attempts: u32,
    pub next_eligible_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub tx_id: Option<TxId>,
}

impl JobRecord {
    pub fn new(
        id: JobId,
        user_address: UserAddress,
        chain_id: ChainId,
        payload: JobPayload,
        client_op_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_address,
            chain_id,
            payload,
            client_op_id,
            status: JobStatus::Pending,
            attempts: 0,
            next_eligible_at: now,
            created_at: now,
            updated_at: now,
            last_error: None,
            tx_id: None,
        }
    }

    /// The synthetic id the UI shows until `tx_id` is set.
    pub fn offline_tx_id(&self) -> String {
        self.id.offline_tx_id()
    }

    pub fn content_hash(&self) -> String {
        // A lightweight derived dedup aid distinct from client_op_id: hash
        // the serialized payload so identical resubmissions are visible in
        // logs/debugging even though client_op_id is the authoritative key.
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut hasher = DefaultHasher::new();
        if let Ok(bytes) = serde_json::to_vec(&self.payload) {
            bytes.hash(&mut hasher);
        }
        format!("{:x}", hasher.finish())
    }

    pub fn mark_processing(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Processing;
        self.updated_at = now;
    }

    pub fn mark_succeeded(&mut self, tx_id: TxId, now: DateTime<Utc>) {
        self.status = JobStatus::Succeeded;
        self.tx_id = Some(tx_id);
        self.updated_at = now;
    }

    /// A transient failure returns the job to `Pending`, bumping attempts
    /// and pushing `next_eligible_at` out by the caller-computed backoff.
    pub fn mark_transient_failure(&mut self, error: String, next_eligible_at: DateTime<Utc>, now: DateTime<Utc>) {
        self.status = JobStatus::Pending;
        self.attempts += 1;
        self.next_eligible_at = next_eligible_at;
        self.last_error = Some(error);
        self.updated_at = now;
    }

    pub fn mark_failed(&mut self, error: String, now: DateTime<Utc>) {
        self.status = JobStatus::Failed;
        self.last_error = Some(error);
        self.updated_at = now;
    }

    pub fn mark_skipped(&mut self, reason: String, now: DateTime<Utc>) {
        self.status = JobStatus::Skipped;
        self.last_error = Some(reason);
        self.updated_at = now;
    }
}
