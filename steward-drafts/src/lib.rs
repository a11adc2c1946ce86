//! Durable per-user, per-resource draft storage for the garden-stewardship
//! submission core.
//!
//! `DraftStore` holds `DraftRecord`s keyed by `(userAddress, chainId,
//! targetResourceId, actionId)` alongside an ordered sequence of
//! `DraftImage` blobs, deriving a `firstIncompleteStep` wizard cursor from
//! the record's fields and image count on every write. DraftStore is
//! intentionally independent of the upload pipeline (`steward-media`) —
//! draft images are raw bytes until a draft is enqueued as a job, at which
//! point the embedding application reads them out and hands them to
//! `steward_queue::QueueController::add_job`.
//!
//! ```no_run
//! use steward_drafts::{DraftFields, DraftStore, InMemoryDraftStore};
//! use steward_core::{ChainId, UserAddress};
//! # async fn doc() {
//! let store = InMemoryDraftStore::new();
//! let draft_id = store
//!     .create_or_get_draft(UserAddress::new("0xabc"), ChainId(10), "garden-1".into(), Some(7))
//!     .await
//!     .unwrap();
//! store
//!     .update_draft(&draft_id, DraftFields { feedback: Some("looks healthy".into()), ..Default::default() })
//!     .await
//!     .unwrap();
//! # }
//! ```

pub mod error;
pub mod store;
pub mod types;

pub use error::{DraftError, DraftResult};
pub use store::{DraftStore, InMemoryDraftStore, SharedDraftStore};
pub use types::{DraftFields, DraftId, DraftImage, DraftImageId, DraftRecord, DraftStep};
