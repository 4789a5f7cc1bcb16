//! Subscriber registry for live channel fan-out
//!
//! Tracks the observers interested in push messages and delivers each
//! message to all of them in registration order. Observers may subscribe
//! and unsubscribe freely while a session is active, including from
//! inside their own message callback.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::error;

use crate::message::LiveMessage;

/// Handle identifying one registration, used for removal.
///
/// Registering the same closure twice yields two distinct ids and two
/// deliveries per message; deduplication is the caller's choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Callback = Arc<dyn Fn(&LiveMessage) + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<(SubscriberId, Callback)>,
}

/// The set of active observers for a live channel.
#[derive(Default)]
pub struct SubscriberRegistry {
    inner: Mutex<Inner>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Every subsequent [`dispatch`](Self::dispatch)
    /// invokes it once until the returned id is unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> SubscriberId
    where
        F: Fn(&LiveMessage) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriberId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, Arc::new(observer)));
        id
    }

    /// Remove a registration. Returns false (not an error) when the id
    /// was never registered or is already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|(entry_id, _)| *entry_id != id);
        inner.entries.len() != before
    }

    /// Deliver a message to every registered observer, in registration
    /// order.
    ///
    /// Iterates over a snapshot taken at dispatch start, so an observer
    /// that subscribes or unsubscribes during its own invocation cannot
    /// corrupt the in-progress delivery. A panicking observer is caught
    /// and logged; later observers still receive the message.
    pub fn dispatch(&self, message: &LiveMessage) {
        let snapshot: Vec<(SubscriberId, Callback)> = self.lock().entries.clone();
        for (id, callback) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
                error!(subscriber = id.0, "Subscriber panicked during dispatch");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // Callbacks never run under the lock, so poisoning cannot leave the
    // registry in a torn state; recover the guard instead of panicking.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
