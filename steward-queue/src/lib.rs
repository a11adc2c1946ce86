//! Durable per-user job queue, runner, and controller for the
//! garden-stewardship submission core.
//!
//! `JobStore` holds durable `Job` records with a dedup index on
//! `(userAddress, clientOpId)`; `JobRunner` drives a single claimed job
//! through simulate → upload → encode → submit → await confirmation →
//! reconcile; `QueueController` is the singleton entry point the UI calls
//! (`add_job`, `process_job`, `flush`, `has_pending`, `get_stats`) and owns
//! the background worker loop per user. `EventBus` is a synchronous,
//! order-preserving pub/sub of queue lifecycle events.
//!
//! ```no_run
//! use std::sync::Arc;
//! use steward_core::SystemClock;
//! use steward_queue::{EventBus, QueueController, JobRunner, JobRunnerConfig};
//! use steward_queue::store::InMemoryJobStore;
//! # async fn doc<S: steward_chain::Submitter + 'static, E: steward_chain::Encoder + 'static, I: steward_chain::Indexer + 'static>(
//! #     submitter: Arc<S>, encoder: Arc<E>, indexer: Arc<I>, media: Arc<steward_media::MediaUploader>,
//! # ) {
//! let store = Arc::new(InMemoryJobStore::new());
//! let event_bus = Arc::new(EventBus::new());
//! let runner = Arc::new(JobRunner::new(
//!     store.clone(), media, submitter, encoder, indexer, event_bus.clone(), Arc::new(SystemClock),
//!     JobRunnerConfig::default(),
//! ));
//! let controller = QueueController::new(store, runner, event_bus);
//! # let _ = controller;
//! # }
//! ```

pub mod backoff;
pub mod controller;
pub mod error;
pub mod event_bus;
pub mod lease;
pub mod runner;
pub mod store;
pub mod types;

pub use backoff::backoff;
pub use controller::{AddJobResult, FlushResult, ProcessResult, QueueController};
pub use error::{QueueError, QueueResult};
pub use event_bus::EventBus;
pub use lease::TabLease;
pub use runner::{JobRunner, JobRunnerConfig, RunOutcome};
pub use store::{InMemoryJobStore, JobStore, QueueStats, SharedJobStore};
pub use types::{JobId, JobRecord, JobStatus, QueueEvent};
