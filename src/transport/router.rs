//! Event routing.
//!
//! Delivers event frames to the listeners registered for their exact
//! method name, in subscription order. A panicking listener is logged and
//! skipped; delivery continues with the next one.

// ============================================================================
// Imports
// ============================================================================

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{error, trace};

use crate::identifiers::SubscriptionId;
use crate::protocol::Event;

// ============================================================================
// Types
// ============================================================================

/// Event listener callback.
///
/// Called on the connection's event loop task; a slow listener delays
/// delivery of later frames.
pub type EventListener = Arc<dyn Fn(&Event) + Send + Sync>;

/// One registration.
struct Registration {
    id: SubscriptionId,
    event: String,
    listener: EventListener,
}

// ============================================================================
// Subscription
// ============================================================================

/// Handle returned by [`Connection::on`](crate::Connection::on).
///
/// Pass it to [`Connection::off`](crate::Connection::off) to stop delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: SubscriptionId,
    event: String,
}

impl Subscription {
    /// Returns the subscription id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the event name this subscription listens for.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }
}

// ============================================================================
// EventRouter
// ============================================================================

/// Listener registry for one connection.
pub(crate) struct EventRouter {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl EventRouter {
    /// Creates an empty router.
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            registrations: Mutex::new(Vec::new()),
        }
    }

    /// Registers a listener for one event name.
    pub(crate) fn subscribe(&self, event: &str, listener: EventListener) -> Subscription {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            event: event.to_string(),
            listener,
        });

        trace!(subscription = %id, event, "Listener registered");
        Subscription {
            id,
            event: event.to_string(),
        }
    }

    /// Removes a listener. Returns `false` if it was already removed.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        let removed = registrations.len() != before;

        if removed {
            trace!(subscription = %id, "Listener removed");
        }
        removed
    }

    /// Delivers an event to every listener registered for its name.
    ///
    /// Listeners are snapshotted before the first call, so a listener may
    /// subscribe or unsubscribe without deadlocking. Returns the number of
    /// listeners that completed without panicking.
    pub(crate) fn dispatch(&self, event: &Event) -> usize {
        let listeners: Vec<(SubscriptionId, EventListener)> = self
            .registrations
            .lock()
            .iter()
            .filter(|registration| registration.event == event.method)
            .map(|registration| (registration.id, Arc::clone(&registration.listener)))
            .collect();

        if listeners.is_empty() {
            trace!(event = %event.method, "No listener for event");
            return 0;
        }

        let mut delivered = 0;
        for (id, listener) in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    error!(subscription = %id, event = %event.method, "Event listener panicked");
                }
            }
        }
        delivered
    }

    /// Returns the number of listeners registered for an event name.
    pub(crate) fn listener_count(&self, event: &str) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|registration| registration.event == event)
            .count()
    }
}

// ============================================================================
// Tests
// ============================================================================
