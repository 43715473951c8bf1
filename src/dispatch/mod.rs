//! Typed message dispatch: binding message kinds to host-thread handlers.
//!
//! This module contains:
//! - [`DispatchNode`]: Binds one message type to a handler executed on the host
//! - [`NodeContext`]: Handle a handler uses to gate its own node
//! - [`KeyMessage`] / [`InputHandler`]: The keyboard instantiation
//!
//! Nodes form a tree over a shared action queue: when an active node's
//! handler accepts a message, the message is forwarded to every child node,
//! each through its own queue.

mod input;
mod node;

pub use input::{InputHandler, KeyMessage};
pub use node::{DispatchNode, Handler, NodeContext};
