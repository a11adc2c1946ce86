use std::collections::HashSet;
use std::sync::Arc;

use steward_chain::{Indexer, TxId};
use steward_core::UserAddress;
use steward_queue::{JobStatus, JobStore, SharedJobStore};

use crate::error::SyncResult;
use crate::types::{MergeItem, MergeOrigin};

/// Unifies confirmed indexer attestations with local queue state for a
/// single resource, so the UI never has to reason about confirmation lag
/// itself.
pub struct MergeView<I: Indexer> {
    indexer: Arc<I>,
    job_store: SharedJobStore,
}

impl<I: Indexer> MergeView<I> {
    pub fn new(indexer: Arc<I>, job_store: SharedJobStore) -> Self {
        Self { indexer, job_store }
    }

    /// Items for `resource_id`, newest submission first.
    pub async fn for_resource(&self, user_address: &UserAddress, resource_id: &str) -> SyncResult<Vec<MergeItem>> {
        let attestations = self.indexer.query_for_resource(resource_id).await?;
        let indexed_client_op_ids: HashSet<&str> = attestations
            .iter()
            .filter_map(|attestation| attestation.client_op_id.as_deref())
            .collect();

        let mut items: Vec<MergeItem> = attestations
            .iter()
            .map(|attestation| MergeItem {
                resource_id: attestation.resource_id.clone(),
                tx_id: attestation.tx_id.clone(),
                client_op_id: attestation.client_op_id.clone(),
                submitted_at: attestation.observed_at,
                origin: MergeOrigin::Confirmed,
            })
            .collect();

        let local_jobs = self.job_store.list_by_user(user_address).await?;
        for job in local_jobs {
            if job.payload.target_resource_id() != resource_id {
                continue;
            }
            if indexed_client_op_ids.contains(job.client_op_id.as_str()) {
                continue;
            }
            let item = match job.status {
                JobStatus::Succeeded => job.tx_id.clone().map(|tx_id| MergeItem {
                    resource_id: resource_id.to_string(),
                    tx_id,
                    client_op_id: Some(job.client_op_id.clone()),
                    submitted_at: job.updated_at,
                    origin: MergeOrigin::RecentlySubmitted { job_id: job.id.clone() },
                }),
                JobStatus::Pending | JobStatus::Processing => Some(MergeItem {
                    resource_id: resource_id.to_string(),
                    tx_id: TxId::new(job.offline_tx_id()),
                    client_op_id: Some(job.client_op_id.clone()),
                    submitted_at: job.created_at,
                    origin: MergeOrigin::Queued { job_id: job.id.clone() },
                }),
                JobStatus::Failed | JobStatus::Skipped => None,
            };
            if let Some(item) = item {
                items.push(item);
            }
        }

        items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(items)
    }
}
