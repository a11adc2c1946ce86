//! A monotonic, test-overridable `now()`. Components that read or write a
//! timestamp — draft cursors in `InMemoryDraftStore`, `nextEligibleAt`/
//! completion/reconciliation timing in `JobRunner`, `QueueController`'s
//! job-add and flush timestamps — take an `Arc<dyn Clock>` rather than
//! calling `chrono::Utc::now()` directly, so tests can advance time
//! deterministically instead of sleeping.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock: wall-clock UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
