//! # Podium
//!
//! Host-thread event dispatch for interactive experiment platforms.
//!
//! Podium is a purpose-built concurrency core for presentation software where
//! many threads produce events (input devices, audio callbacks, timers,
//! network listeners) but all presentation state must be mutated on exactly
//! one "host" thread, in submission order, without blocking any producer.
//!
//! ## Core Concepts
//!
//! - **Action queue**: Multi-producer, single-consumer FIFO drained by the host
//! - **Dispatch nodes**: Typed message handlers that always run on the host
//! - **State-change bus**: Synchronous, ordered broadcast of named transitions
//! - **Scheduler**: Delayed and repeating submission from a timer thread
//!
//! ## Example
//!
//! ```rust
//! use podium::{Action, ActionQueue};
//! use std::sync::Arc;
//!
//! let queue = Arc::new(ActionQueue::new());
//!
//! // Any thread may submit; the call never blocks.
//! queue.submit(Action::new("greet", || println!("hello from the host")));
//!
//! // The host thread drains, executing items in submission order.
//! queue.drain_once().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod bus;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod report;

// Re-exports for convenience
pub use bus::{ExtraData, ExtraValue, StateChangeBus, SubscriptionId};
pub use dispatch::{DispatchNode, InputHandler, KeyMessage, NodeContext};
pub use error::{DispatchError, Result};
pub use queue::{Action, ActionQueue, HostLoop, Scheduler, TimerId};
pub use report::FaultReport;
