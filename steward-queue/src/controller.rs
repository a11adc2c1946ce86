use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use steward_chain::{Encoder, Indexer, JobPayload, Submitter, TxId};
use steward_core::{AuthMode, ChainId, Clock, UserAddress};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::QueueResult;
use crate::event_bus::EventBus;
use crate::lease::TabLease;
use crate::runner::{JobRunner, RunOutcome};
use crate::store::{JobStore, QueueStats, SharedJobStore};
use crate::types::{JobId, JobRecord, JobStatus, QueueEvent};

/// How long an idle worker loop waits before checking `claim_next` again
/// when there was nothing eligible to run.
const WORKER_IDLE_INTERVAL: Duration = Duration::from_millis(200);

pub struct AddJobResult {
    pub job_id: JobId,
    pub offline_tx_id: String,
    pub client_op_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessResult {
    pub success: bool,
    pub tx_id: Option<TxId>,
    pub skipped: bool,
    pub error: Option<String>,
}

impl ProcessResult {
    fn from_outcome(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Succeeded { tx_id } => Self {
                success: true,
                tx_id: Some(tx_id),
                skipped: false,
                error: None,
            },
            RunOutcome::Skipped { reason } => Self {
                success: false,
                tx_id: None,
                skipped: true,
                error: Some(reason),
            },
            RunOutcome::Failed { reason } => Self {
                success: false,
                tx_id: None,
                skipped: false,
                error: Some(reason),
            },
            RunOutcome::Retrying { reason } => Self {
                success: false,
                tx_id: None,
                skipped: false,
                error: Some(reason),
            },
        }
    }

    fn from_job(job: &JobRecord) -> Self {
        Self {
            success: job.status == JobStatus::Succeeded,
            tx_id: job.tx_id.clone(),
            skipped: job.status == JobStatus::Skipped,
            error: job.last_error.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlushResult {
    pub processed: u32,
    pub failed: u32,
    pub skipped: u32,
}

/// Singleton coordinator: accepts jobs, runs a background worker loop per
/// user while a lease is held, and exposes the inline `process_job`/`flush`
/// entry points the UI calls directly. `S`/`E`/`I` are fixed by whichever
/// `Submitter`/`Encoder`/`Indexer` the embedding app constructed this
/// controller with for the user's current auth mode; a mode switch is
/// handled by the caller rebuilding the controller, not by branching
/// inside it.
pub struct QueueController<S, E, I> {
    store: SharedJobStore,
    runner: Arc<JobRunner<S, E, I>>,
    event_bus: Arc<EventBus>,
    lease: Arc<TabLease>,
}

impl<S, E, I> QueueController<S, E, I>
where
    S: Submitter + 'static,
    E: Encoder + 'static,
    I: Indexer + 'static,
{
    pub fn new(store: SharedJobStore, runner: Arc<JobRunner<S, E, I>>, event_bus: Arc<EventBus>) -> Self {
        Self {
            store,
            runner,
            event_bus,
            lease: Arc::new(TabLease::new()),
        }
    }

    #[instrument(skip(self, payload))]
    pub async fn add_job(
        &self,
        user_address: UserAddress,
        chain_id: ChainId,
        payload: JobPayload,
        client_op_id: Option<String>,
    ) -> QueueResult<AddJobResult> {
        let client_op_id = client_op_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let now = self.runner.clock.now();
        let job = JobRecord::new(JobId::new(), user_address, chain_id, payload, client_op_id, now);
        let inserted = self.store.put_job(job).await?;

        self.event_bus.emit(QueueEvent::JobAdded {
            job_id: inserted.id.clone(),
            at: now,
        });

        Ok(AddJobResult {
            job_id: inserted.id.clone(),
            offline_tx_id: inserted.offline_tx_id(),
            client_op_id: inserted.client_op_id.clone(),
        })
    }

    /// Inline processing triggered immediately after enqueue. A no-op that
    /// returns the job's current terminal result if it already progressed
    /// past `pending` (another tab's worker loop, or an earlier call, got
    /// there first).
    pub async fn process_job(&self, job_id: &JobId) -> QueueResult<ProcessResult> {
        let job = self.store.get(job_id).await?;
        if job.status != JobStatus::Pending {
            return Ok(ProcessResult::from_job(&job));
        }

        match self.store.claim_next(&job.user_address, self.runner.clock.now()).await? {
            Some(claimed) if claimed.id == job.id => {
                let outcome = self.runner.run(claimed).await?;
                Ok(ProcessResult::from_outcome(outcome))
            }
            _ => {
                let current = self.store.get(job_id).await?;
                Ok(ProcessResult::from_job(&current))
            }
        }
    }

    /// Drains every eligible job for `user_address`, one at a time, in
    /// `claimNext` order. Emits `queue_sync_started`/`queue_sync_completed`
    /// around the drain so the UI sees exactly one sync cycle rather than
    /// a storm of per-event notifications.
    #[instrument(skip(self))]
    pub async fn flush(&self, user_address: &UserAddress) -> QueueResult<FlushResult> {
        self.event_bus.emit(QueueEvent::QueueSyncStarted {
            user_address: user_address.to_string(),
            at: self.runner.clock.now(),
        });

        let mut result = FlushResult::default();
        loop {
            let claimed = self.store.claim_next(user_address, self.runner.clock.now()).await?;
            let Some(job) = claimed else { break };
            match self.runner.run(job).await? {
                RunOutcome::Succeeded { .. } => result.processed += 1,
                RunOutcome::Skipped { .. } => result.skipped += 1,
                RunOutcome::Failed { .. } => result.failed += 1,
                RunOutcome::Retrying { .. } => {}
            }
        }

        self.event_bus.emit(QueueEvent::QueueSyncCompleted {
            user_address: user_address.to_string(),
            at: self.runner.clock.now(),
        });

        Ok(result)
    }

    pub async fn has_pending(&self, user_address: &UserAddress) -> QueueResult<bool> {
        self.prune_succeeded_jobs(user_address).await?;
        let stats = self.store.stats(user_address).await?;
        Ok(stats.pending > 0 || stats.processing > 0)
    }

    pub async fn get_stats(&self, user_address: &UserAddress) -> QueueResult<QueueStats> {
        self.prune_succeeded_jobs(user_address).await?;
        self.store.stats(user_address).await
    }

    /// Called by the embedding app whenever the browser's online/offline
    /// state changes. Auto-flush only fires for sponsored-mode users —
    /// wallet-mode users must resync explicitly, since flushing behind
    /// their back would mean signing transactions without an on-screen
    /// prompt. Returns `None` when the transition doesn't trigger a flush.
    #[instrument(skip(self))]
    pub async fn on_connectivity_change(
        &self,
        user_address: &UserAddress,
        is_online: bool,
        auth_mode: AuthMode,
    ) -> QueueResult<Option<FlushResult>> {
        if is_online && auth_mode == AuthMode::Sponsored {
            Ok(Some(self.flush(user_address).await?))
        } else {
            Ok(None)
        }
    }

    /// Drops `succeeded` jobs past the retention window so `stats`/
    /// `has_pending` readers don't keep paying for jobs the indexer has had
    /// a full day to reconcile.
    async fn prune_succeeded_jobs(&self, user_address: &UserAddress) -> QueueResult<()> {
        self.store
            .prune_reconciled(user_address, self.runner.clock.now(), self.runner.config.succeeded_job_retention)
            .await?;
        Ok(())
    }

    /// Spawns the single background worker loop for `user_address`. Holds
    /// the lease for as long as it runs claimed jobs; yields it back
    /// whenever there is nothing eligible, so another context can take
    /// over if this one goes idle or is dropped. `shutdown` ends the loop
    /// and releases the lease.
    pub fn spawn_worker(
        self: &Arc<Self>,
        user_address: UserAddress,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if *shutdown.borrow() {
                    break;
                }

                if !controller.lease.try_acquire(&user_address) {
                    tokio::select! {
                        _ = tokio::time::sleep(WORKER_IDLE_INTERVAL) => continue,
                        _ = shutdown.changed() => break,
                    }
                }

                let claimed = controller.store.claim_next(&user_address, controller.runner.clock.now()).await;
                match claimed {
                    Ok(Some(job)) => {
                        if let Err(err) = controller.runner.run(job).await {
                            tracing::warn!(error = %err, "job runner returned an infrastructure error");
                        }
                    }
                    Ok(None) => {
                        controller.lease.release(&user_address);
                        tokio::select! {
                            _ = tokio::time::sleep(WORKER_IDLE_INTERVAL) => {}
                            _ = shutdown.changed() => break,
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "claim_next failed in worker loop");
                        controller.lease.release(&user_address);
                        break;
                    }
                }
            }
            controller.lease.release(&user_address);
            info!(user = %user_address, "worker loop exited");
        })
    }
}
