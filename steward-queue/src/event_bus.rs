use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use crate::types::QueueEvent;

pub type EventHandler = Arc<dyn Fn(&QueueEvent) + Send + Sync>;

/// Synchronous, order-preserving in-process pub/sub. Unlike a channel-based
/// broadcaster, `emit` calls every handler inline before returning, so
/// delivery order always equals emission order and there is no buffering
/// to overflow. Handlers must not block; a handler that panics is caught
/// and logged rather than unwinding into the caller.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(u64, EventHandler)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: QueueEvent) {
        let handlers: Vec<EventHandler> = self.handlers.read().iter().map(|(_, h)| h.clone()).collect();
        for handler in handlers {
            let outcome = catch_unwind(AssertUnwindSafe(|| handler(&event)));
            if outcome.is_err() {
                error!(event = event.event_name(), "event bus handler panicked");
            }
        }
    }
}

/// `on`/`unsubscribe` pair. Kept as a plain method pair rather than an
/// RAII guard since subscribers in this core are long-lived (UI cache
/// invalidation, toasts, analytics) and explicitly manage their lifetime.
impl EventBus {
    pub fn on<F>(self: &Arc<Self>, handler: F) -> u64
    where
        F: Fn(&QueueEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    pub fn off(&self, id: u64) {
        self.handlers.write().retain(|(existing, _)| *existing != id);
    }
}
