use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use steward_chain::{
    ConfirmOutcome, EncodeError, Encoder, Indexer, SimulateOutcome, Submitter, SubmitError, TxId,
    DEFAULT_CONFIRMATION_DEADLINE,
};
use steward_chain::payload::{JobPayload, WorkJobPayload};
use steward_core::Clock;
use steward_media::{ImageBlob, MediaUploader};
use tracing::{info, instrument, warn};

use crate::backoff::{backoff, BackoffConfig};
use crate::error::QueueResult;
use crate::event_bus::EventBus;
use crate::store::{JobStore, SharedJobStore};
use crate::types::{JobRecord, QueueEvent};

/// Outcome of driving one job through its full pipeline. Never an `Err` for
/// a classified submission failure — those are captured as `Failed`/
/// `Retrying` and persisted on the `Job` itself; `Err` is reserved for
/// store-level infrastructure failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded { tx_id: TxId },
    Skipped { reason: String },
    Failed { reason: String },
    Retrying { reason: String },
}

#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    pub confirmation_deadline: Duration,
    pub reconcile_attempts: u32,
    pub reconcile_interval: Duration,
    pub backoff: BackoffConfig,
    pub succeeded_job_retention: chrono::Duration,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            confirmation_deadline: DEFAULT_CONFIRMATION_DEADLINE,
            reconcile_attempts: 6,
            reconcile_interval: Duration::from_millis(2500),
            backoff: BackoffConfig::default(),
            succeeded_job_retention: chrono::Duration::hours(24),
        }
    }
}

impl JobRunnerConfig {
    /// Reads `confirmation.deadline_ms`, `reconcile.attempts`,
    /// `reconcile.interval_ms` and `retention.succeeded_hours` from a
    /// snapshot, falling back to defaults for any key that is absent or
    /// unparseable. `backoff` is built the same way via
    /// `BackoffConfig::from_snapshot`.
    pub fn from_snapshot(snapshot: &steward_core::CoreConfigSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            confirmation_deadline: snapshot
                .get_u64("confirmation.deadline_ms")
                .map(Duration::from_millis)
                .unwrap_or(defaults.confirmation_deadline),
            reconcile_attempts: snapshot
                .get_u64("reconcile.attempts")
                .map(|v| v as u32)
                .unwrap_or(defaults.reconcile_attempts),
            reconcile_interval: snapshot
                .get_u64("reconcile.interval_ms")
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconcile_interval),
            backoff: BackoffConfig::from_snapshot(snapshot),
            succeeded_job_retention: snapshot
                .get_u64("retention.succeeded_hours")
                .map(|v| chrono::Duration::hours(v as i64))
                .unwrap_or(defaults.succeeded_job_retention),
        }
    }
}

/// Drives a single claimed `Job` through simulate → upload → encode →
/// submit → await confirmation → reconcile, in that order, persisting its
/// progress on the `JobStore` after every step so a crash resumes from the
/// last durable checkpoint rather than from scratch.
pub struct JobRunner<S, E, I> {
    store: SharedJobStore,
    media: Arc<MediaUploader>,
    submitter: Arc<S>,
    encoder: Arc<E>,
    indexer: Arc<I>,
    event_bus: Arc<EventBus>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: JobRunnerConfig,
}

impl<S, E, I> JobRunner<S, E, I>
where
    S: Submitter,
    E: Encoder,
    I: Indexer,
{
    pub fn new(
        store: SharedJobStore,
        media: Arc<MediaUploader>,
        submitter: Arc<S>,
        encoder: Arc<E>,
        indexer: Arc<I>,
        event_bus: Arc<EventBus>,
        clock: Arc<dyn Clock>,
        config: JobRunnerConfig,
    ) -> Self {
        Self {
            store,
            media,
            submitter,
            encoder,
            indexer,
            event_bus,
            clock,
            config,
        }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id))]
    pub async fn run(&self, mut job: JobRecord) -> QueueResult<RunOutcome> {
        self.event_bus.emit(QueueEvent::JobProcessing {
            job_id: job.id.clone(),
            at: self.clock.now(),
        });

        if let Some(outcome) = self.guard(&mut job).await? {
            return Ok(outcome);
        }

        if let Some(outcome) = self.simulate(&mut job).await? {
            return Ok(outcome);
        }

        if let Some(outcome) = self.upload(&mut job).await? {
            return Ok(outcome);
        }

        let encoded = match self.encoder.encode_for_submission(&job.payload) {
            Ok(encoded) => encoded,
            Err(EncodeError::MissingMedia { index }) => {
                return self
                    .finish_failed(&mut job, format!("missing uploaded media at index {index}"))
                    .await;
            }
        };

        let recipient = recipient_for(&job.payload);

        let tx_id = match self.submitter.submit(&encoded, &recipient).await {
            Ok(tx_id) => tx_id,
            Err(err) => return self.finish_submit_error(&mut job, err).await,
        };

        match self
            .submitter
            .await_confirmation(&tx_id, self.config.confirmation_deadline)
            .await
        {
            Ok(ConfirmOutcome::Confirmed) => {}
            Ok(ConfirmOutcome::Timeout) => {
                return self
                    .finish_retrying(&mut job, "confirmation timed out".to_string())
                    .await;
            }
            Ok(ConfirmOutcome::Reverted) => {
                return self.finish_failed(&mut job, "transaction reverted".to_string()).await;
            }
            Err(err) => return self.finish_submit_error(&mut job, err).await,
        }

        self.reconcile(&job).await;

        let now = self.clock.now();
        self.store.complete(&job.id, tx_id.clone(), now).await?;
        self.event_bus.emit(QueueEvent::JobCompleted {
            job_id: job.id.clone(),
            tx_id: tx_id.clone(),
            at: now,
        });
        Ok(RunOutcome::Succeeded { tx_id })
    }

    async fn guard(&self, job: &mut JobRecord) -> QueueResult<Option<RunOutcome>> {
        let client_op_id = job.client_op_id.clone();
        let existing = self
            .indexer
            .find_by_client_op_id(&client_op_id)
            .await
            .unwrap_or(None);

        if existing.is_some() {
            let now = self.clock.now();
            let reason = "already observed by the indexer".to_string();
            self.store.skip(&job.id, reason.clone(), now).await?;
            self.event_bus.emit(QueueEvent::JobSkipped {
                job_id: job.id.clone(),
                reason: reason.clone(),
                at: now,
            });
            return Ok(Some(RunOutcome::Skipped { reason }));
        }
        Ok(None)
    }

    async fn simulate(&self, job: &mut JobRecord) -> QueueResult<Option<RunOutcome>> {
        let recipient = recipient_for(&job.payload);
        let simulation_payload = self.encoder.encode_for_simulation(&job.payload);

        match self.submitter.simulate(&simulation_payload, &recipient).await {
            Ok(SimulateOutcome::Ok) => Ok(None),
            Ok(SimulateOutcome::KnownContractError { reason }) => {
                self.finish_failed(job, reason).await.map(Some)
            }
            Ok(SimulateOutcome::UnknownRevert) => {
                self.finish_failed(job, "simulation reverted".to_string()).await.map(Some)
            }
            Err(err) => self.finish_submit_error(job, err).await.map(Some),
        }
    }

    async fn upload(&self, job: &mut JobRecord) -> QueueResult<Option<RunOutcome>> {
        let pending: Vec<(usize, ImageBlob)> = match &job.payload {
            JobPayload::Work(work) => work
                .pending_upload_indices()
                .into_iter()
                .map(|index| (index, work.images[index].clone()))
                .collect(),
            JobPayload::Approval(_) => return Ok(None),
        };

        for (index, image) in pending {
            match self.media.upload(&image).await {
                Ok(receipt) => {
                    if let JobPayload::Work(work) = &mut job.payload {
                        work.uploaded_ids[index] = Some(receipt.id.clone());
                    }
                    self.store.put_job(job.clone()).await?;
                }
                Err(err) if err.is_retryable() => {
                    return self
                        .finish_retrying(job, format!("image upload failed: {err}"))
                        .await
                        .map(Some);
                }
                Err(err) => {
                    return self
                        .finish_failed(job, format!("image upload failed: {err}"))
                        .await
                        .map(Some);
                }
            }
        }
        Ok(None)
    }

    /// Best-effort visibility poll; does not gate success. Reconciliation
    /// exists to shrink the MergeView lag window, not to re-validate the
    /// transaction that already confirmed on-chain.
    async fn reconcile(&self, job: &JobRecord) {
        for attempt in 0..self.config.reconcile_attempts {
            match self.indexer.find_by_client_op_id(&job.client_op_id).await {
                Ok(Some(_)) => {
                    info!(attempt, "indexer reconciliation observed attestation");
                    let retention = self.config.succeeded_job_retention;
                    if let Err(err) = self.store.prune_reconciled(&job.user_address, self.clock.now(), retention).await {
                        warn!(error = %err, "prune_reconciled failed after successful reconciliation");
                    }
                    return;
                }
                Ok(None) => {}
                Err(err) => warn!(attempt, error = %err, "reconciliation poll failed"),
            }
            if attempt + 1 < self.config.reconcile_attempts {
                tokio::time::sleep(self.config.reconcile_interval).await;
            }
        }
        warn!("reconciliation attempt budget exhausted without observing attestation");
    }

    async fn finish_failed(&self, job: &mut JobRecord, reason: String) -> QueueResult<RunOutcome> {
        let now = self.clock.now();
        self.store.fail(&job.id, reason.clone(), None, now).await?;
        self.event_bus.emit(QueueEvent::JobFailed {
            job_id: job.id.clone(),
            error: reason.clone(),
            at: now,
        });
        Ok(RunOutcome::Failed { reason })
    }

    async fn finish_retrying(&self, job: &mut JobRecord, reason: String) -> QueueResult<RunOutcome> {
        let now = self.clock.now();
        let next_eligible_at =
            now + chrono::Duration::from_std(backoff(job.attempts + 1, &self.config.backoff)).unwrap_or_default();
        self.store.fail(&job.id, reason.clone(), Some(next_eligible_at), now).await?;
        Ok(RunOutcome::Retrying { reason })
    }

    async fn finish_submit_error(&self, job: &mut JobRecord, err: SubmitError) -> QueueResult<RunOutcome> {
        match err {
            SubmitError::Cancelled => self.finish_failed(job, "cancelled".to_string()).await,
            SubmitError::KnownContractRevert { reason } => self.finish_failed(job, reason).await,
            SubmitError::UnknownRevert => self.finish_failed(job, "transaction reverted".to_string()).await,
            SubmitError::Transient { reason } => self.finish_retrying(job, reason).await,
            SubmitError::Permanent { reason } => self.finish_failed(job, reason).await,
        }
    }
}

fn recipient_for(payload: &JobPayload) -> String {
    match payload {
        JobPayload::Work(WorkJobPayload { target_resource_id, .. }) => target_resource_id.clone(),
        JobPayload::Approval(approval) => approval.recipient_address.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use steward_chain::{EncodedPayload, IndexedAttestation, JsonEncoder};
    use steward_core::{ChainId, SystemClock, UserAddress};
    use steward_media::{InMemoryContentStore, MediaConfig};

    use crate::store::{InMemoryJobStore, JobStore};
    use crate::types::JobId;

    /// A local stand-in for steward-core's own `FixedClock`, which is
    /// `#[cfg(test)]`-private to that crate and so unreachable from here.
    #[derive(Clone)]
    struct FixedClock(Arc<Mutex<chrono::DateTime<Utc>>>);

    impl FixedClock {
        fn new(start: chrono::DateTime<Utc>) -> Self {
            Self(Arc::new(Mutex::new(start)))
        }

        fn advance(&self, delta: chrono::Duration) {
            *self.0.lock() += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> chrono::DateTime<Utc> {
            *self.0.lock()
        }
    }

    struct StubSubmitter {
        reject: bool,
        confirm: ConfirmOutcome,
        calls: Mutex<u32>,
    }

    impl StubSubmitter {
        fn confirmed() -> Self {
            Self {
                reject: false,
                confirm: ConfirmOutcome::Confirmed,
                calls: Mutex::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                reject: true,
                confirm: ConfirmOutcome::Confirmed,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Submitter for StubSubmitter {
        async fn simulate(
            &self,
            _payload: &EncodedPayload,
            _recipient: &str,
        ) -> steward_chain::SubmitResult<SimulateOutcome> {
            Ok(SimulateOutcome::Ok)
        }

        async fn submit(&self, _payload: &EncodedPayload, _recipient: &str) -> steward_chain::SubmitResult<TxId> {
            *self.calls.lock() += 1;
            if self.reject {
                Err(SubmitError::Cancelled)
            } else {
                Ok(TxId::new("0xAAA"))
            }
        }

        async fn await_confirmation(
            &self,
            _tx_id: &TxId,
            _deadline: Duration,
        ) -> steward_chain::SubmitResult<ConfirmOutcome> {
            Ok(self.confirm.clone())
        }
    }

    struct StubIndexer {
        known_op_id: Mutex<Option<String>>,
    }

    impl StubIndexer {
        fn empty() -> Self {
            Self {
                known_op_id: Mutex::new(None),
            }
        }

        fn knowing(client_op_id: &str) -> Self {
            Self {
                known_op_id: Mutex::new(Some(client_op_id.to_string())),
            }
        }
    }

    #[async_trait]
    impl Indexer for StubIndexer {
        async fn find_by_client_op_id(
            &self,
            client_op_id: &str,
        ) -> steward_chain::SubmitResult<Option<IndexedAttestation>> {
            let known = self.known_op_id.lock();
            if known.as_deref() == Some(client_op_id) {
                Ok(Some(IndexedAttestation {
                    tx_id: TxId::new("0xAAA"),
                    resource_id: "garden-1".into(),
                    client_op_id: Some(client_op_id.to_string()),
                    observed_at: Utc::now(),
                }))
            } else {
                Ok(None)
            }
        }

        async fn query_for_resource(
            &self,
            _resource_id: &str,
        ) -> steward_chain::SubmitResult<Vec<IndexedAttestation>> {
            Ok(vec![])
        }
    }

    fn work_job(images: usize, client_op_id: &str) -> JobRecord {
        let now = Utc::now();
        let blobs = (0..images)
            .map(|i| steward_media::ImageBlob::new(Bytes::from(vec![i as u8]), "image/jpeg"))
            .collect();
        let payload = JobPayload::Work(WorkJobPayload::new(
            "garden-1".into(),
            1,
            "title".into(),
            "feedback".into(),
            vec![],
            None,
            blobs,
            client_op_id,
            now,
        ));
        JobRecord::new(JobId::new(), UserAddress::new("0xuser"), ChainId(10), payload, client_op_id.into(), now)
    }

    fn fast_config() -> JobRunnerConfig {
        JobRunnerConfig {
            confirmation_deadline: Duration::from_secs(5),
            reconcile_attempts: 1,
            reconcile_interval: Duration::from_millis(1),
            ..JobRunnerConfig::default()
        }
    }

    #[test]
    fn from_snapshot_reads_confirmation_reconcile_and_retention_keys() {
        let mut core_config = steward_core::CoreConfig::new();
        core_config.set("confirmation.deadline_ms", "9000");
        core_config.set("reconcile.attempts", "3");
        core_config.set("reconcile.interval_ms", "500");
        core_config.set("retention.succeeded_hours", "48");
        let snapshot = core_config.snapshot();

        let config = JobRunnerConfig::from_snapshot(&snapshot);
        assert_eq!(config.confirmation_deadline, Duration::from_millis(9000));
        assert_eq!(config.reconcile_attempts, 3);
        assert_eq!(config.reconcile_interval, Duration::from_millis(500));
        assert_eq!(config.succeeded_job_retention, chrono::Duration::hours(48));
    }

    #[test]
    fn from_snapshot_falls_back_to_defaults_when_keys_absent() {
        let snapshot = steward_core::CoreConfig::new().snapshot();
        let config = JobRunnerConfig::from_snapshot(&snapshot);
        let defaults = JobRunnerConfig::default();
        assert_eq!(config.confirmation_deadline, defaults.confirmation_deadline);
        assert_eq!(config.reconcile_attempts, defaults.reconcile_attempts);
        assert_eq!(config.reconcile_interval, defaults.reconcile_interval);
        assert_eq!(config.succeeded_job_retention, defaults.succeeded_job_retention);
    }

    #[tokio::test]
    async fn happy_path_sponsored_online_emits_completed_event() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let media = Arc::new(MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::confirmed());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(StubIndexer::empty());
        let event_bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        event_bus.on(move |event| seen_clone.lock().push(event.event_name()));

        let runner = JobRunner::new(store.clone(), media, submitter, encoder, indexer, event_bus, Arc::new(SystemClock), fast_config());

        let job = store.put_job(work_job(2, "op-1")).await.unwrap();
        let claimed = store.claim_next(&UserAddress::new("0xuser"), Utc::now()).await.unwrap().unwrap();
        assert_eq!(claimed.id, job.id);

        let outcome = runner.run(claimed).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Succeeded { .. }));
        assert_eq!(*seen.lock(), vec!["job_processing", "job_completed"]);

        let stored = store.get(&job.id).await.unwrap();
        assert_eq!(stored.status, crate::types::JobStatus::Succeeded);
        assert!(stored.tx_id.is_some());
    }

    /// Wraps `InMemoryContentStore` with a shared `AtomicUsize` call counter
    /// on `put`, so resumed-upload tests can assert exactly which images
    /// were actually re-uploaded rather than just the run's final outcome.
    struct CountingContentStore {
        inner: steward_media::InMemoryContentStore,
        puts: Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait]
    impl steward_media::ContentStore for CountingContentStore {
        async fn put(
            &self,
            bytes: Bytes,
            content_type: Option<&str>,
        ) -> steward_media::MediaResult<steward_media::store::PutResult> {
            self.puts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.put(bytes, content_type).await
        }

        async fn exists(&self, id: &steward_media::MediaId) -> steward_media::MediaResult<bool> {
            self.inner.exists(id).await
        }

        async fn delete(&self, id: &steward_media::MediaId) -> steward_media::MediaResult<()> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn resuming_upload_does_not_reupload_completed_images() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let puts = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let content_store = CountingContentStore {
            inner: steward_media::InMemoryContentStore::new(),
            puts: puts.clone(),
        };
        let media = Arc::new(MediaUploader::new(content_store, MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::confirmed());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(StubIndexer::empty());
        let event_bus = Arc::new(EventBus::new());

        let runner = JobRunner::new(store.clone(), media, submitter, encoder, indexer, event_bus, Arc::new(SystemClock), fast_config());

        let mut job = work_job(3, "op-resume");
        if let JobPayload::Work(work) = &mut job.payload {
            work.uploaded_ids[0] = Some(steward_media::MediaId::new());
            work.uploaded_ids[1] = Some(steward_media::MediaId::new());
        }
        let inserted = store.put_job(job).await.unwrap();
        let claimed = store.claim_next(&UserAddress::new("0xuser"), Utc::now()).await.unwrap().unwrap();
        assert_eq!(claimed.id, inserted.id);

        let outcome = runner.run(claimed).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Succeeded { .. }));
        assert_eq!(
            puts.load(std::sync::atomic::Ordering::SeqCst),
            1,
            "only the remaining un-uploaded image should be uploaded"
        );
    }

    #[tokio::test]
    async fn wallet_rejection_marks_job_failed_with_cancelled() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let media = Arc::new(MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::rejecting());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(StubIndexer::empty());
        let event_bus = Arc::new(EventBus::new());

        let runner = JobRunner::new(store.clone(), media, submitter, encoder, indexer, event_bus, Arc::new(SystemClock), fast_config());

        let job = store.put_job(work_job(0, "op-reject")).await.unwrap();
        let claimed = store.claim_next(&UserAddress::new("0xuser"), Utc::now()).await.unwrap().unwrap();

        let outcome = runner.run(claimed).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Failed { .. }));

        let stored = store.get(&job.id).await.unwrap();
        assert_eq!(stored.status, crate::types::JobStatus::Failed);
        assert_eq!(stored.last_error.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn guard_skips_job_already_seen_by_indexer() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let media = Arc::new(MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::confirmed());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(StubIndexer::knowing("op-dup"));
        let event_bus = Arc::new(EventBus::new());

        let runner = JobRunner::new(store.clone(), media, submitter, encoder, indexer, event_bus, Arc::new(SystemClock), fast_config());

        let job = store.put_job(work_job(0, "op-dup")).await.unwrap();
        let claimed = store.claim_next(&UserAddress::new("0xuser"), Utc::now()).await.unwrap().unwrap();

        let outcome = runner.run(claimed).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Skipped { .. }));

        let stored = store.get(&job.id).await.unwrap();
        assert_eq!(stored.status, crate::types::JobStatus::Skipped);
    }

    /// Reports unseen on its first call (the guard step) and seen on every
    /// call after, so reconcile's own poll is the one that observes the
    /// attestation rather than guard skipping the job outright.
    struct IndexerSeenAfterFirstPoll {
        calls: std::sync::atomic::AtomicU32,
    }

    #[async_trait]
    impl Indexer for IndexerSeenAfterFirstPoll {
        async fn find_by_client_op_id(
            &self,
            client_op_id: &str,
        ) -> steward_chain::SubmitResult<Option<IndexedAttestation>> {
            let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if n == 0 {
                Ok(None)
            } else {
                Ok(Some(IndexedAttestation {
                    tx_id: TxId::new("0xAAA"),
                    resource_id: "garden-1".into(),
                    client_op_id: Some(client_op_id.to_string()),
                    observed_at: Utc::now(),
                }))
            }
        }

        async fn query_for_resource(
            &self,
            _resource_id: &str,
        ) -> steward_chain::SubmitResult<Vec<IndexedAttestation>> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn successful_reconcile_prunes_older_succeeded_jobs_for_the_user() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let media = Arc::new(MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::confirmed());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(IndexerSeenAfterFirstPoll {
            calls: std::sync::atomic::AtomicU32::new(0),
        });
        let event_bus = Arc::new(EventBus::new());

        let user = UserAddress::new("0xuser");
        let old_job = store.put_job(work_job(0, "op-old")).await.unwrap();
        let claimed_old = store.claim_next(&user, Utc::now()).await.unwrap().unwrap();
        store
            .complete(&claimed_old.id, TxId::new("0xOLD"), Utc::now() - chrono::Duration::hours(48))
            .await
            .unwrap();

        let runner = JobRunner::new(store.clone(), media, submitter, encoder, indexer, event_bus, Arc::new(SystemClock), fast_config());
        let job = store.put_job(work_job(0, "op-new")).await.unwrap();
        let claimed = store.claim_next(&user, Utc::now()).await.unwrap().unwrap();

        let outcome = runner.run(claimed).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Succeeded { .. }));

        assert!(store.get(&old_job.id).await.is_err());
        assert!(store.get(&job.id).await.is_ok());
    }

    #[tokio::test]
    async fn retry_schedules_next_eligible_at_from_injected_clock_not_wall_clock() {
        let store: SharedJobStore = Arc::new(InMemoryJobStore::new());
        let media = Arc::new(MediaUploader::new(InMemoryContentStore::new(), MediaConfig::default()));
        let submitter = Arc::new(StubSubmitter::confirmed());
        let encoder = Arc::new(JsonEncoder);
        let indexer = Arc::new(StubIndexer::empty());
        let event_bus = Arc::new(EventBus::new());

        let frozen_at = Utc::now() - chrono::Duration::days(3650);
        let clock = FixedClock::new(frozen_at);
        clock.advance(chrono::Duration::minutes(5));

        let runner = JobRunner::new(
            store.clone(),
            media,
            submitter,
            encoder,
            indexer,
            event_bus,
            Arc::new(clock.clone()),
            fast_config(),
        );

        let inserted = store.put_job(work_job(0, "op-retry")).await.unwrap();
        let mut job = inserted.clone();
        runner
            .finish_retrying(&mut job, "confirmation timed out".to_string())
            .await
            .unwrap();

        let advanced_at = frozen_at + chrono::Duration::minutes(5);
        let stored = store.get(&inserted.id).await.unwrap();
        assert!(stored.next_eligible_at >= advanced_at);
        assert!(stored.next_eligible_at <= advanced_at + chrono::Duration::minutes(1));
    }
}
