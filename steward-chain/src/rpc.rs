use async_trait::async_trait;

use crate::encoder::EncodedPayload;
use crate::error::SubmitResult;
use crate::types::{ConfirmOutcome, IndexedAttestation, SimulateOutcome, TxId};

/// The chain RPC surface: simulate, send, and poll for a receipt. Both
/// submitter variants share one implementation of this per target chain.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn simulate(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<SimulateOutcome>;
    async fn wait_for_receipt(&self, tx_id: &TxId) -> SubmitResult<ConfirmOutcome>;
}

/// Read-only query API for confirmed attestations, with 2-6s typical lag
/// behind the chain. Used by JobRunner's Guard/Reconcile steps and by
/// MergeView to mask that lag from the UI.
#[async_trait]
pub trait Indexer: Send + Sync {
    async fn find_by_client_op_id(&self, client_op_id: &str) -> SubmitResult<Option<IndexedAttestation>>;
    async fn query_for_resource(&self, resource_id: &str) -> SubmitResult<Vec<IndexedAttestation>>;
}
