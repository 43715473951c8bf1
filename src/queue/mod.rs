//! Action queue: cross-thread work marshaling onto one host thread.
//!
//! This module implements the dispatch backbone using crossbeam channels:
//! - **`Action`**: A labeled unit of deferred work
//! - **`ActionQueue`**: Multi-producer FIFO drained by exactly one host thread
//! - **`HostLoop`**: A dedicated drain thread for embeddings without a frame tick
//! - **`Scheduler`**: Timer thread for delayed and repeating submission
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   submit(Action)    ┌──────────────┐
//! │Input Thread  │ ─────────────────▶  │              │
//! └──────────────┘                     │  ActionQueue │   drain_once()
//! ┌──────────────┐   submit(Action)    │    (FIFO)    │ ◀───────────────
//! │Audio Callback│ ─────────────────▶  │              │   host thread,
//! └──────────────┘                     └──────────────┘   once per frame
//! ┌──────────────┐   submit(Action)           ▲
//! │Timer Thread  │ ───────────────────────────┘
//! └──────────────┘
//! ```

mod action;
mod action_queue;
mod host_loop;
mod scheduler;

pub use action::Action;
pub use action_queue::ActionQueue;
pub use host_loop::HostLoop;
pub use scheduler::{Scheduler, TimerId};
