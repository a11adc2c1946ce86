//! Merge-view read projection over indexer attestations and the local job
//! queue for the garden-stewardship submission core.
//!
//! `MergeView` answers "what has this user submitted for this resource,"
//! unifying indexer-confirmed attestations with local `Job`s still
//! `pending`/`processing`/`succeeded-but-not-yet-reconciled` so the UI
//! never has to reason about confirmation lag itself.

pub mod error;
pub mod types;
pub mod view;

pub use error::{SyncError, SyncResult};
pub use types::{MergeItem, MergeOrigin};
pub use view::MergeView;
