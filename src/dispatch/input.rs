//! Keyboard input dispatch: the key-event instantiation of [`DispatchNode`].
//!
//! Input device callbacks run on whatever thread the platform gives them;
//! [`InputHandler::key`] marshals each key transition onto the host thread.

use super::node::{DispatchNode, NodeContext};
use crate::queue::ActionQueue;
use std::sync::Arc;

/// One key transition: a named key going down or up.
///
/// Immutable value created by the producer at the moment of the external
/// event and consumed exactly once by the bound handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMessage {
    /// Platform key name (`"a"`, `"space"`, `"escape"`, …).
    pub key: String,
    /// `true` on press, `false` on release.
    pub down: bool,
}

impl KeyMessage {
    /// Create a key message.
    pub fn new(key: impl Into<String>, down: bool) -> Self {
        Self {
            key: key.into(),
            down,
        }
    }
}

/// Typed key-event injection for one handler.
///
/// A thin wrapper over `DispatchNode<KeyMessage>` exposing the producer
/// entry point used by input device callbacks. The node itself is available
/// through [`node`](Self::node) for registering child handlers.
pub struct InputHandler {
    node: Arc<DispatchNode<KeyMessage>>,
}

impl InputHandler {
    /// Create an input handler feeding `queue`.
    pub fn new(
        queue: &Arc<ActionQueue>,
        handler: impl FnMut(&NodeContext, &KeyMessage) -> bool + Send + 'static,
    ) -> Self {
        Self {
            node: Arc::new(DispatchNode::new(queue, "key-input", handler)),
        }
    }

    /// Report a key transition. Callable from any thread; never blocks.
    pub fn key(&self, key: impl Into<String>, down: bool) {
        self.node.dispatch(KeyMessage::new(key, down));
    }

    /// Replace the handler (routed through the queue, see
    /// [`DispatchNode::set_handler`]).
    pub fn set_handler(
        &self,
        handler: impl FnMut(&NodeContext, &KeyMessage) -> bool + Send + 'static,
    ) {
        self.node.set_handler(handler);
    }

    /// Gate or un-gate key handling.
    pub fn set_active(&self, on: bool) {
        self.node.set_active(on);
    }

    /// The underlying dispatch node, for child registration.
    pub fn node(&self) -> &Arc<DispatchNode<KeyMessage>> {
        &self.node
    }
}
