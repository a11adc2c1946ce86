use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use steward_chain::TxId;
use steward_core::UserAddress;
use tracing::instrument;

use crate::error::{QueueError, QueueResult};
use crate::types::{JobId, JobRecord, JobStatus};

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueStats {
    pub total: u64,
    pub pending: u64,
    pub processing: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Durable CRUD for `Job` records. `claim_next` is the single chokepoint
/// that enforces one job in `processing` per user at a time; every caller
/// — the inline `process_job` path and the background worker loop alike —
/// must go through it rather than reading then writing status separately.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put_job(&self, job: JobRecord) -> QueueResult<JobRecord>;
    async fn claim_next(&self, user_address: &UserAddress, now: DateTime<Utc>) -> QueueResult<Option<JobRecord>>;
    async fn complete(&self, job_id: &JobId, tx_id: TxId, now: DateTime<Utc>) -> QueueResult<JobRecord>;
    async fn fail(
        &self,
        job_id: &JobId,
        error: String,
        next_eligible_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> QueueResult<JobRecord>;
    async fn skip(&self, job_id: &JobId, reason: String, now: DateTime<Utc>) -> QueueResult<JobRecord>;
    async fn get(&self, job_id: &JobId) -> QueueResult<JobRecord>;
    async fn list_by_user(&self, user_address: &UserAddress) -> QueueResult<Vec<JobRecord>>;
    async fn stats(&self, user_address: &UserAddress) -> QueueResult<QueueStats>;
    /// Deletes a job discarded by the user. Only `pending`/`failed` jobs
    /// may be removed this way; a `processing` job cannot be deleted.
    async fn discard(&self, job_id: &JobId) -> QueueResult<()>;

    /// Removes `succeeded` jobs for `user_address` whose `updated_at` is
    /// older than `retention`, freeing storage once a job has had ample
    /// time to show up in the indexer. Returns the number removed. Safe to
    /// call opportunistically on every read; callers are not required to
    /// run it on a schedule.
    async fn prune_reconciled(
        &self,
        user_address: &UserAddress,
        now: DateTime<Utc>,
        retention: chrono::Duration,
    ) -> QueueResult<u32>;
}

#[derive(Default)]
struct Shard {
    jobs: HashMap<JobId, JobRecord>,
    dedup: HashMap<(UserAddress, String), JobId>,
}

/// In-process, in-memory implementation backing both tests and the
/// browser's single-profile durable-store model (a real build swaps this
/// for an IndexedDB-backed store behind the same trait).
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: RwLock<Shard>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    #[instrument(skip(self, job))]
    async fn put_job(&self, job: JobRecord) -> QueueResult<JobRecord> {
        let mut shard = self.inner.write();
        let key = (job.user_address.clone(), job.client_op_id.clone());

        if let Some(existing_id) = shard.dedup.get(&key).cloned() {
            let existing = shard
                .jobs
                .get(&existing_id)
                .cloned()
                .ok_or_else(|| QueueError::Internal("dedup index pointed at missing job".into()))?;
            if existing.status.is_terminal() {
                return Ok(existing);
            }
            if existing_id != job.id {
                return Err(QueueError::DuplicateClientOpId {
                    existing: existing_id.to_string(),
                });
            }
        }

        shard.dedup.insert(key, job.id.clone());
        shard.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    #[instrument(skip(self))]
    async fn claim_next(&self, user_address: &UserAddress, now: DateTime<Utc>) -> QueueResult<Option<JobRecord>> {
        let mut shard = self.inner.write();

        let already_processing = shard
            .jobs
            .values()
            .any(|j| j.user_address == *user_address && j.status == JobStatus::Processing);
        if already_processing {
            return Ok(None);
        }

        let next_id = shard
            .jobs
            .values()
            .filter(|j| {
                j.user_address == *user_address && j.status == JobStatus::Pending && j.next_eligible_at <= now
            })
            .min_by_key(|j| j.created_at)
            .map(|j| j.id.clone());

        match next_id {
            Some(id) => {
                let job = shard.jobs.get_mut(&id).expect("id came from this map");
                job.mark_processing(now);
                Ok(Some(job.clone()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn complete(&self, job_id: &JobId, tx_id: TxId, now: DateTime<Utc>) -> QueueResult<JobRecord> {
        let mut shard = self.inner.write();
        let job = shard
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        job.mark_succeeded(tx_id, now);
        Ok(job.clone())
    }

    #[instrument(skip(self, error))]
    async fn fail(
        &self,
        job_id: &JobId,
        error: String,
        next_eligible_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> QueueResult<JobRecord> {
        let mut shard = self.inner.write();
        let job = shard
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        match next_eligible_at {
            Some(next) => job.mark_transient_failure(error, next, now),
            None => job.mark_failed(error, now),
        }
        Ok(job.clone())
    }

    #[instrument(skip(self))]
    async fn skip(&self, job_id: &JobId, reason: String, now: DateTime<Utc>) -> QueueResult<JobRecord> {
        let mut shard = self.inner.write();
        let job = shard
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        job.mark_skipped(reason, now);
        Ok(job.clone())
    }

    async fn get(&self, job_id: &JobId) -> QueueResult<JobRecord> {
        self.inner
            .read()
            .jobs
            .get(job_id)
            .cloned()
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))
    }

    async fn list_by_user(&self, user_address: &UserAddress) -> QueueResult<Vec<JobRecord>> {
        let shard = self.inner.read();
        let mut jobs: Vec<JobRecord> = shard
            .jobs
            .values()
            .filter(|j| j.user_address == *user_address)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }

    async fn stats(&self, user_address: &UserAddress) -> QueueResult<QueueStats> {
        let shard = self.inner.read();
        let mut stats = QueueStats::default();
        for job in shard.jobs.values().filter(|j| j.user_address == *user_address) {
            stats.total += 1;
            match job.status {
                JobStatus::Pending => stats.pending += 1,
                JobStatus::Processing => stats.processing += 1,
                JobStatus::Succeeded => stats.succeeded += 1,
                JobStatus::Failed => stats.failed += 1,
                JobStatus::Skipped => {}
            }
        }
        Ok(stats)
    }

    async fn discard(&self, job_id: &JobId) -> QueueResult<()> {
        let mut shard = self.inner.write();
        let job = shard
            .jobs
            .get(job_id)
            .ok_or_else(|| QueueError::NotFound(job_id.to_string()))?;
        if !matches!(job.status, JobStatus::Pending | JobStatus::Failed) {
            return Err(QueueError::AlreadyTerminal(job_id.to_string()));
        }
        let key = (job.user_address.clone(), job.client_op_id.clone());
        shard.jobs.remove(job_id);
        shard.dedup.remove(&key);
        Ok(())
    }

    async fn prune_reconciled(
        &self,
        user_address: &UserAddress,
        now: DateTime<Utc>,
        retention: chrono::Duration,
    ) -> QueueResult<u32> {
        let mut shard = self.inner.write();
        let stale: Vec<JobId> = shard
            .jobs
            .values()
            .filter(|j| {
                j.user_address == *user_address
                    && j.status == JobStatus::Succeeded
                    && now - j.updated_at >= retention
            })
            .map(|j| j.id.clone())
            .collect();

        for job_id in &stale {
            if let Some(job) = shard.jobs.remove(job_id) {
                let key = (job.user_address, job.client_op_id);
                shard.dedup.remove(&key);
            }
        }
        Ok(stale.len() as u32)
    }
}

pub type SharedJobStore = Arc<dyn JobStore>;

#[cfg(test)]
mod tests {
    use super::*;
    use steward_chain::{ApprovalJobPayload, JobPayload};
    use steward_core::ChainId;

    fn sample(user: &str, client_op_id: &str, now: DateTime<Utc>) -> JobRecord {
        JobRecord::new(
            JobId::new(),
            UserAddress::new(user),
            ChainId(10),
            JobPayload::Approval(ApprovalJobPayload {
                target_resource_id: "garden-1".into(),
                work_id: "work-1".into(),
                approved: true,
                feedback: None,
                recipient_address: "0xabc".into(),
            }),
            client_op_id.into(),
            now,
        )
    }

    #[tokio::test]
    async fn put_job_dedups_on_user_and_client_op_id() {
        let store = InMemoryJobStore::new();
        let now = Utc::now();
        let job = sample("0xuser", "op-1", now);
        let inserted = store.put_job(job.clone()).await.unwrap();
        store
            .complete(&inserted.id, TxId::new("0xAAA"), now)
            .await
            .unwrap();

        let resubmit = sample("0xuser", "op-1", now);
        let returned = store.put_job(resubmit).await.unwrap();
        assert_eq!(returned.id, inserted.id);
        assert_eq!(returned.status, JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn claim_next_enforces_single_processing_job_per_user() {
        let store = InMemoryJobStore::new();
        let now = Utc::now();
        store.put_job(sample("0xuser", "op-1", now)).await.unwrap();
        store.put_job(sample("0xuser", "op-2", now)).await.unwrap();

        let first = store.claim_next(&UserAddress::new("0xuser"), now).await.unwrap();
        assert!(first.is_some());

        let second = store.claim_next(&UserAddress::new("0xuser"), now).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn claim_next_respects_next_eligible_at() {
        let store = InMemoryJobStore::new();
        let now = Utc::now();
        let mut job = sample("0xuser", "op-1", now);
        job.next_eligible_at = now + chrono::Duration::seconds(30);
        store.put_job(job).await.unwrap();

        let claimed = store.claim_next(&UserAddress::new("0xuser"), now).await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn discard_rejects_processing_job() {
        let store = InMemoryJobStore::new();
        let now = Utc::now();
        let job = store.put_job(sample("0xuser", "op-1", now)).await.unwrap();
        store.claim_next(&UserAddress::new("0xuser"), now).await.unwrap();
        let err = store.discard(&job.id).await.unwrap_err();
        assert!(matches!(err, QueueError::AlreadyTerminal(_)));
    }

    #[tokio::test]
    async fn prune_reconciled_removes_succeeded_jobs_past_retention_window() {
        let store = InMemoryJobStore::new();
        let user = UserAddress::new("0xuser");
        let now = Utc::now();
        let job = store.put_job(sample("0xuser", "op-1", now)).await.unwrap();
        store.claim_next(&user, now).await.unwrap();
        store.complete(&job.id, TxId::new("0xAAA"), now).await.unwrap();

        let removed = store
            .prune_reconciled(&user, now + chrono::Duration::hours(25), chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&job.id).await.is_err());

        let resubmit = sample("0xuser", "op-1", now);
        let returned = store.put_job(resubmit).await.unwrap();
        assert_eq!(returned.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn prune_reconciled_keeps_recent_succeeded_jobs() {
        let store = InMemoryJobStore::new();
        let user = UserAddress::new("0xuser");
        let now = Utc::now();
        let job = store.put_job(sample("0xuser", "op-1", now)).await.unwrap();
        store.claim_next(&user, now).await.unwrap();
        store.complete(&job.id, TxId::new("0xAAA"), now).await.unwrap();

        let removed = store
            .prune_reconciled(&user, now + chrono::Duration::hours(1), chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(store.get(&job.id).await.is_ok());
    }
}
