//! Transaction encoding and dual-path submission for the garden-stewardship
//! submission core.
//!
//! A `Job`'s payload becomes wire bytes via an [`encoder::Encoder`], then
//! travels through a [`submitter::Submitter`] — either [`submitter::DirectSubmitter`]
//! (a wallet signer) or [`submitter::SponsoredSubmitter`] (a smart-account
//! bundler) depending on which one the caller currently has available.
//! Neither submitter variant is part of a `Job`'s own state; the JobRunner
//! picks whichever one matches the user's current auth mode at run time.

pub mod encoder;
pub mod error;
pub mod payload;
pub mod rpc;
pub mod signer;
pub mod submitter;
pub mod types;

pub use encoder::{EncodedPayload, EncodeError, Encoder, JsonEncoder};
pub use error::{SubmitError, SubmitResult};
pub use payload::{ApprovalJobPayload, JobKind, JobPayload, WorkJobPayload};
pub use rpc::{ChainRpc, Indexer};
pub use signer::{SmartAccountClient, Signer};
pub use submitter::{DirectSubmitter, SponsoredSubmitter, Submitter, DEFAULT_CONFIRMATION_DEADLINE};
pub use types::{ConfirmOutcome, IndexedAttestation, SimulateOutcome, TxId};
