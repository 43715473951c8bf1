//! `ActionQueue`: multi-producer, single-consumer FIFO bound to one host thread.
//!
//! Producers submit from any thread and return immediately. Exactly one host
//! thread drains the queue and executes each item run-to-completion, in
//! submission order. A panicking item is caught at the queue boundary,
//! reported, and never stalls the items behind it.

use super::action::Action;
use crate::error::{DispatchError, Result};
use crate::report::{FaultHook, FaultReport, FaultSink};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::Duration;
use tracing::{debug, trace};

/// A single-consumer, multi-producer FIFO work queue.
///
/// The queue binds to the first thread that drains it; that thread becomes
/// the host thread for the queue's lifetime. Submission is unbounded: if the
/// host loop stalls, items accumulate rather than being dropped or blocking
/// producers. [`len`](Self::len) exposes the depth for observability.
///
/// Typically shared as `Arc<ActionQueue>` between producers, dispatch nodes,
/// and the host loop.
pub struct ActionQueue {
    /// Pending work, in submission order.
    tx: Sender<Action>,
    rx: Receiver<Action>,
    /// Wake token for a parked host loop. Capacity 1: one token is enough
    /// to wake, extra submissions need not pile up tokens.
    notify_tx: Sender<()>,
    notify_rx: Receiver<()>,
    /// The thread that first drained the queue.
    host: OnceLock<ThreadId>,
    /// Guard against re-entrant drains.
    draining: AtomicBool,
    /// While paused, drains execute nothing; submissions still accumulate.
    paused: AtomicBool,
    faults: FaultSink,
}

impl ActionQueue {
    /// Create an empty, unbound queue.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        let (notify_tx, notify_rx) = bounded(1);
        Self {
            tx,
            rx,
            notify_tx,
            notify_rx,
            host: OnceLock::new(),
            draining: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            faults: FaultSink::new(),
        }
    }

    /// Append an action to the tail of the queue.
    ///
    /// Callable from any thread, including the host thread itself (an item
    /// may submit follow-up work mid-drain; it runs on a later pass). Never
    /// blocks and never fails.
    pub fn submit(&self, action: Action) {
        trace!(item = action.label(), depth = self.rx.len(), "action submitted");
        // Receiver lives in self, so the channel cannot be disconnected.
        let _ = self.tx.send(action);
        let _ = self.notify_tx.try_send(());
    }

    /// Execute every item that was pending when the call started.
    ///
    /// Host thread only. Items run one at a time, in submission order, each
    /// to completion. Items submitted during the pass are left for a later
    /// pass. Returns the number of items executed.
    ///
    /// # Errors
    ///
    /// [`DispatchError::WrongThread`] if called from a thread other than the
    /// one the queue is bound to, [`DispatchError::ReentrantDrain`] if called
    /// from inside an executing item.
    pub fn drain_once(&self) -> Result<usize> {
        let me = thread::current().id();
        let host = *self.host.get_or_init(|| me);
        if host != me {
            return Err(DispatchError::WrongThread {
                expected: host,
                actual: me,
            });
        }
        if self.draining.swap(true, Ordering::Acquire) {
            return Err(DispatchError::ReentrantDrain);
        }

        let executed = if self.paused.load(Ordering::Acquire) {
            0
        } else {
            let pending = self.rx.len();
            let mut count = 0;
            for _ in 0..pending {
                let Ok(action) = self.rx.try_recv() else { break };
                self.run_one(action);
                count += 1;
            }
            count
        };

        self.draining.store(false, Ordering::Release);
        if executed > 0 {
            trace!(executed, "drain pass complete");
        }
        Ok(executed)
    }

    /// Block until the queue has runnable work or the timeout elapses.
    ///
    /// Returns `true` if work is (probably) available. Spurious wakes are
    /// possible; callers loop around [`drain_once`](Self::drain_once) anyway.
    pub fn wait_for_work(&self, timeout: Duration) -> bool {
        if !self.is_paused() && !self.rx.is_empty() {
            return true;
        }
        self.notify_rx.recv_timeout(timeout).is_ok()
    }

    /// Number of items currently pending.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Whether no items are pending.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Stop executing items. Submissions still accumulate.
    pub fn pause(&self) {
        debug!("queue paused");
        self.paused.store(true, Ordering::Release);
    }

    /// Resume executing items, waking a parked host loop.
    pub fn resume(&self) {
        debug!("queue resumed");
        self.paused.store(false, Ordering::Release);
        let _ = self.notify_tx.try_send(());
    }

    /// Whether the queue is currently paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Install a fault hook, replacing the default log-based reporting.
    pub fn set_fault_hook(&self, hook: impl Fn(&FaultReport) + Send + Sync + 'static) {
        self.faults.set_hook(Arc::new(hook));
    }

    /// Run one item, isolating a panic at the queue boundary.
    fn run_one(&self, action: Action) {
        let label = action.label();
        trace!(item = label, "executing action");
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| action.invoke())) {
            self.faults
                .raise(&FaultReport::from_panic(label, payload.as_ref()));
        }
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new()
    }
}
