use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::encoder::EncodedPayload;
use crate::error::{SubmitError, SubmitResult};
use crate::rpc::ChainRpc;
use crate::signer::{SmartAccountClient, Signer};
use crate::types::{ConfirmOutcome, SimulateOutcome, TxId};

/// Default bound for `await_confirmation`, per the JobRunner's pipeline.
pub const DEFAULT_CONFIRMATION_DEADLINE: Duration = Duration::from_secs(60);

/// Contract shared by both submission paths. JobRunner depends only on
/// this trait; which concrete implementation it holds is a function of
/// the user's current auth mode, not of the job itself.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn simulate(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<SimulateOutcome>;
    async fn submit(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<TxId>;
    async fn await_confirmation(&self, tx_id: &TxId, deadline: Duration) -> SubmitResult<ConfirmOutcome>;
}

/// Sends a directly-signed transaction via the user's wallet.
pub struct DirectSubmitter<R: ChainRpc> {
    signer: Arc<dyn Signer>,
    rpc: Arc<R>,
}

impl<R: ChainRpc> DirectSubmitter<R> {
    pub fn new(signer: Arc<dyn Signer>, rpc: Arc<R>) -> Self {
        Self { signer, rpc }
    }
}

#[async_trait]
impl<R: ChainRpc> Submitter for DirectSubmitter<R> {
    #[instrument(skip(self, payload))]
    async fn simulate(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<SimulateOutcome> {
        self.rpc.simulate(payload, recipient).await
    }

    #[instrument(skip(self, payload))]
    async fn submit(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<TxId> {
        self.signer
            .send_transaction(payload, recipient)
            .await
            .map_err(|err| reclassify(err))
    }

    async fn await_confirmation(&self, tx_id: &TxId, deadline: Duration) -> SubmitResult<ConfirmOutcome> {
        await_with_deadline(self.rpc.as_ref(), tx_id, deadline).await
    }
}

/// Sends a sponsored user-operation via a smart-account bundler. Policies
/// are otherwise identical to the direct path.
pub struct SponsoredSubmitter<R: ChainRpc> {
    smart_account: Arc<dyn SmartAccountClient>,
    rpc: Arc<R>,
}

impl<R: ChainRpc> SponsoredSubmitter<R> {
    pub fn new(smart_account: Arc<dyn SmartAccountClient>, rpc: Arc<R>) -> Self {
        Self { smart_account, rpc }
    }
}

#[async_trait]
impl<R: ChainRpc> Submitter for SponsoredSubmitter<R> {
    async fn simulate(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<SimulateOutcome> {
        self.rpc.simulate(payload, recipient).await
    }

    async fn submit(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<TxId> {
        self.smart_account
            .send_user_operation(payload, recipient)
            .await
            .map_err(reclassify)
    }

    async fn await_confirmation(&self, tx_id: &TxId, deadline: Duration) -> SubmitResult<ConfirmOutcome> {
        await_with_deadline(self.rpc.as_ref(), tx_id, deadline).await
    }
}

/// A signer/bundler call already returns a `SubmitError`; this just makes
/// sure a raw cancellation phrase that slipped through as `Permanent`
/// (e.g. a generic error wrapping the original message) still lands on
/// `Cancelled` where applicable.
fn reclassify(err: SubmitError) -> SubmitError {
    match &err {
        SubmitError::Permanent { reason } => SubmitError::classify(reason),
        other => other.clone(),
    }
}

async fn await_with_deadline<R: ChainRpc>(
    rpc: &R,
    tx_id: &TxId,
    deadline: Duration,
) -> SubmitResult<ConfirmOutcome> {
    match tokio::time::timeout(deadline, rpc.wait_for_receipt(tx_id)).await {
        Ok(result) => result,
        Err(_) => Ok(ConfirmOutcome::Timeout),
    }
}
