//! `StateChangeBus`: synchronous multicast of named state transitions.
//!
//! The bus is a constructed object with explicit lifetime — created at
//! session start, handed by reference to every component that needs it —
//! not an ambient static. Every subscriber receives every publish and
//! filters on the state name itself.

use super::extra::ExtraData;
use crate::report::{FaultHook, FaultReport, FaultSink};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Identifies a subscription for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener signature: `(state_name, on, extra_data)`.
type StateCallback = Arc<dyn Fn(&str, bool, &ExtraData) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    callback: StateCallback,
}

/// Multicast channel for named experiment-state transitions.
///
/// [`publish`](Self::publish) runs every currently-subscribed listener
/// synchronously, in subscription order, on the calling thread, and returns
/// only once all of them ran. The bus does no thread marshaling of its own:
/// by convention publishes happen on the host thread, and a producer thread
/// that wants to publish routes the call through the action queue.
///
/// A panicking listener is caught, reported, and delivery continues with
/// the remaining listeners.
pub struct StateChangeBus {
    subscribers: Mutex<Vec<Subscriber>>,
    next_id: AtomicU64,
    faults: FaultSink,
}

impl StateChangeBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            faults: FaultSink::new(),
        }
    }

    /// Register a listener. Listeners run in subscription order.
    ///
    /// The bus owns the callback until [`unsubscribe`](Self::unsubscribe);
    /// a component that goes away without unsubscribing leaves a live (if
    /// useless) closure, never a dangling one.
    pub fn subscribe(&self, callback: impl Fn(&str, bool, &ExtraData) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_subscribers().push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        debug!(id = id.0, "listener subscribed");
        id
    }

    /// Remove a listener. Idempotent: an unknown or already-removed id is a
    /// no-op, not an error.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_subscribers().retain(|s| s.id != id);
        debug!(id = id.0, "listener unsubscribed");
    }

    /// Broadcast one state transition to every subscribed listener.
    ///
    /// Synchronous and subscription-ordered; returns only after every
    /// listener ran. The listener set is snapshotted when the call starts:
    /// a listener subscribing mid-publish first sees the next publish, and
    /// unsubscribing mid-publish does not retract the current delivery.
    pub fn publish(&self, state: &str, on: bool, extra: &ExtraData) {
        debug!(state, on, "publishing state change");
        let snapshot: Vec<StateCallback> = self
            .lock_subscribers()
            .iter()
            .map(|s| Arc::clone(&s.callback))
            .collect();

        for callback in snapshot {
            if let Err(payload) =
                panic::catch_unwind(AssertUnwindSafe(|| callback(state, on, extra)))
            {
                self.faults
                    .raise(&FaultReport::from_panic("state-listener", payload.as_ref()));
            }
        }
    }

    /// Number of current subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock_subscribers().len()
    }

    /// Install a fault hook, replacing the default log-based reporting.
    pub fn set_fault_hook(&self, hook: impl Fn(&FaultReport) + Send + Sync + 'static) {
        self.faults.set_hook(Arc::new(hook) as FaultHook);
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for StateChangeBus {
    fn default() -> Self {
        Self::new()
    }
}
