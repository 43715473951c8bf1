//! `DispatchNode`: a typed binding between a message kind and its handler.
//!
//! Producers call [`DispatchNode::dispatch`] from any thread; the handler
//! runs later, on the host thread, when the queue drains to that item.
//! Handler replacement is itself routed through the queue, so there is no
//! window where an old and a new handler can interleave with in-flight
//! dispatches.

use crate::queue::{Action, ActionQueue};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handler signature: `(context, message) -> accepted`.
///
/// The returned `bool` marks the message as accepted; an accepting node
/// forwards the message to its children.
pub type Handler<T> = Box<dyn FnMut(&NodeContext, &T) -> bool + Send>;

/// Handle passed to a handler, letting it gate its own node.
///
/// The canonical use is a handler that deactivates itself once it has seen
/// the message it was waiting for.
pub struct NodeContext {
    active: Arc<AtomicBool>,
}

impl NodeContext {
    /// Gate or un-gate the node. An inactive node ignores every message.
    pub fn set_active(&self, on: bool) {
        self.active.store(on, Ordering::Relaxed);
    }

    /// Whether the node currently handles messages.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }
}

/// Binds a message type `T` to a handler executed on the host thread.
///
/// The node owns a handle to its [`ActionQueue`]; the queue knows nothing of
/// the nodes feeding it. Multiple nodes may share one queue.
pub struct DispatchNode<T> {
    queue: Arc<ActionQueue>,
    label: &'static str,
    handler: Arc<Mutex<Handler<T>>>,
    active: Arc<AtomicBool>,
    children: Arc<Mutex<Vec<Arc<DispatchNode<T>>>>>,
}

impl<T: Clone + Send + 'static> DispatchNode<T> {
    /// Create a node feeding `queue`, labeled for logs and fault reports.
    pub fn new(
        queue: &Arc<ActionQueue>,
        label: &'static str,
        handler: impl FnMut(&NodeContext, &T) -> bool + Send + 'static,
    ) -> Self {
        Self {
            queue: Arc::clone(queue),
            label,
            handler: Arc::new(Mutex::new(Box::new(handler))),
            active: Arc::new(AtomicBool::new(true)),
            children: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Submit `message` for host-thread handling.
    ///
    /// Callable from any thread; returns immediately. The handler does not
    /// run inside this call.
    pub fn dispatch(&self, message: T) {
        let handler = Arc::clone(&self.handler);
        let active = Arc::clone(&self.active);
        let children = Arc::clone(&self.children);

        self.queue.submit(Action::new(self.label, move || {
            if !active.load(Ordering::Relaxed) {
                return;
            }
            let context = NodeContext {
                active: Arc::clone(&active),
            };
            let accepted = {
                let mut handler = lock_unpoisoned(&handler);
                (*handler)(&context, &message)
            };
            if accepted {
                // Snapshot outside the lock: a child dispatch may re-enter
                // this node's queue.
                let snapshot = lock_unpoisoned(&children).clone();
                for child in snapshot {
                    child.dispatch(message.clone());
                }
            }
        }));
    }

    /// Replace the handler.
    ///
    /// The swap is routed through the queue: dispatches already pending
    /// ahead of this call still see the old handler, later ones see the new
    /// one, and no producer thread ever touches the handler directly.
    pub fn set_handler(&self, handler: impl FnMut(&NodeContext, &T) -> bool + Send + 'static) {
        let slot = Arc::clone(&self.handler);
        let replacement: Handler<T> = Box::new(handler);
        self.queue.submit(Action::new("swap-handler", move || {
            *lock_unpoisoned(&slot) = replacement;
        }));
    }

    /// Gate or un-gate the node without unregistering it anywhere.
    pub fn set_active(&self, on: bool) {
        self.active.store(on, Ordering::Relaxed);
    }

    /// Whether the node currently handles messages.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Register a child. An accepted message is forwarded to every child.
    ///
    /// Registering the same child twice is a no-op.
    pub fn add_child(&self, child: &Arc<Self>) {
        let mut children = lock_unpoisoned(&self.children);
        if !children.iter().any(|c| Arc::ptr_eq(c, child)) {
            children.push(Arc::clone(child));
        }
    }

    /// Unregister a child. Unknown children are a no-op.
    pub fn remove_child(&self, child: &Arc<Self>) {
        lock_unpoisoned(&self.children).retain(|c| !Arc::ptr_eq(c, child));
    }
}

/// Lock, recovering from poisoning.
///
/// A handler panic unwinds through its guard and poisons the mutex, but the
/// boxed handler is never left half-written, so the contents stay valid.
fn lock_unpoisoned<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_dispatch_defers_until_drain() {
        let queue = Arc::new(ActionQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let node = DispatchNode::new(&queue, "number", move |_ctx, msg: &u32| {
            seen_clone.lock().unwrap().push(*msg);
            true
        });

        node.dispatch(7);
        assert!(seen.lock().unwrap().is_empty());

        queue.drain_once().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn test_set_handler_is_ordered_with_dispatches() {
        let queue = Arc::new(ActionQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_old = Arc::clone(&seen);
        let node = DispatchNode::new(&queue, "number", move |_ctx, msg: &u32| {
            seen_old.lock().unwrap().push(format!("old:{msg}"));
            true
        });

        node.dispatch(1);
        let seen_new = Arc::clone(&seen);
        node.set_handler(move |_ctx, msg: &u32| {
            seen_new.lock().unwrap().push(format!("new:{msg}"));
            true
        });
        node.dispatch(2);

        while queue.drain_once().unwrap() > 0 {}
        assert_eq!(*seen.lock().unwrap(), vec!["old:1", "new:2"]);
    }

    #[test]
    fn test_inactive_node_ignores_messages() {
        let queue = Arc::new(ActionQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let node = DispatchNode::new(&queue, "number", move |_ctx, msg: &u32| {
            seen_clone.lock().unwrap().push(*msg);
            true
        });

        node.set_active(false);
        node.dispatch(1);
        queue.drain_once().unwrap();
        assert!(seen.lock().unwrap().is_empty());

        node.set_active(true);
        node.dispatch(2);
        queue.drain_once().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_accepted_message_forwards_to_children() {
        let queue = Arc::new(ActionQueue::new());
        let parent_seen = Arc::new(Mutex::new(Vec::new()));
        let child_seen = Arc::new(Mutex::new(Vec::new()));

        let parent_clone = Arc::clone(&parent_seen);
        let parent = DispatchNode::new(&queue, "parent", move |_ctx, msg: &u32| {
            parent_clone.lock().unwrap().push(*msg);
            *msg < 100 // reject large values
        });

        let child_clone = Arc::clone(&child_seen);
        let child = Arc::new(DispatchNode::new(&queue, "child", move |_ctx, msg: &u32| {
            child_clone.lock().unwrap().push(*msg);
            true
        }));
        parent.add_child(&child);

        parent.dispatch(5);
        parent.dispatch(500);
        while queue.drain_once().unwrap() > 0 {}

        assert_eq!(*parent_seen.lock().unwrap(), vec![5, 500]);
        // Only the accepted message reached the child.
        assert_eq!(*child_seen.lock().unwrap(), vec![5]);
    }

    #[test]
    fn test_removed_child_stops_receiving() {
        let queue = Arc::new(ActionQueue::new());
        let child_seen = Arc::new(Mutex::new(Vec::new()));

        let parent = DispatchNode::new(&queue, "parent", |_ctx, _msg: &u32| true);
        let child_clone = Arc::clone(&child_seen);
        let child = Arc::new(DispatchNode::new(&queue, "child", move |_ctx, msg: &u32| {
            child_clone.lock().unwrap().push(*msg);
            true
        }));

        parent.add_child(&child);
        parent.dispatch(1);
        while queue.drain_once().unwrap() > 0 {}

        parent.remove_child(&child);
        parent.remove_child(&child); // second removal is a no-op
        parent.dispatch(2);
        while queue.drain_once().unwrap() > 0 {}

        assert_eq!(*child_seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_handler_can_deactivate_own_node() {
        let queue = Arc::new(ActionQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let node = DispatchNode::new(&queue, "one-shot", move |ctx, msg: &u32| {
            seen_clone.lock().unwrap().push(*msg);
            ctx.set_active(false);
            true
        });

        node.dispatch(1);
        node.dispatch(2);
        while queue.drain_once().unwrap() > 0 {}

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(!node.is_active());
    }
}
