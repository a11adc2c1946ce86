use async_trait::async_trait;
use steward_core::{ChainId, UserAddress};

use crate::encoder::EncodedPayload;
use crate::error::SubmitResult;
use crate::types::TxId;

/// The signer capability the auth layer hands the core. Absent when the
/// user is unauthenticated; a mode switch invalidates any in-flight claim
/// at the next step boundary, per the JobRunner's step-bounded design.
#[async_trait]
pub trait Signer: Send + Sync {
    fn address(&self) -> &UserAddress;
    fn chain_id(&self) -> ChainId;
    async fn send_transaction(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<TxId>;
}

/// A smart-account bundler client, used by the sponsored path instead of a
/// direct wallet signature.
#[async_trait]
pub trait SmartAccountClient: Send + Sync {
    fn address(&self) -> &UserAddress;
    fn chain_id(&self) -> ChainId;
    async fn send_user_operation(&self, payload: &EncodedPayload, recipient: &str) -> SubmitResult<TxId>;
}
