use std::collections::HashSet;

use parking_lot::Mutex;
use steward_core::UserAddress;

/// A named, per-user cross-context lease. One worker loop per user may hold
/// it at a time; a context that cannot acquire it still enqueues jobs and
/// still observes progress via the EventBus, it simply does not process —
/// the single-writer invariant when multiple tabs are open.
#[derive(Default)]
pub struct TabLease {
    held: Mutex<HashSet<UserAddress>>,
}

impl TabLease {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self, user_address: &UserAddress) -> bool {
        self.held.lock().insert(user_address.clone())
    }

    pub fn release(&self, user_address: &UserAddress) {
        self.held.lock().remove(user_address);
    }

    pub fn is_held(&self, user_address: &UserAddress) -> bool {
        self.held.lock().contains(user_address)
    }
}
