//! Error types for the dispatch core.
//!
//! Submission never fails by contract, so errors here cover misuse of the
//! host-side surface: draining from the wrong thread, re-entering the drain
//! loop, or scheduling against a stopped timer thread.

use std::thread::ThreadId;
use thiserror::Error;

/// Errors raised by queue draining and timed scheduling.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// `drain_once` was called while a drain pass was already executing.
    ///
    /// The drain loop is not reentrant: an item that needs more work must
    /// submit it and let a later pass run it.
    #[error("drain re-entered while a pass was already executing")]
    ReentrantDrain,

    /// `drain_once` was called from a thread other than the host thread.
    ///
    /// A queue binds to the first thread that drains it; every later drain
    /// must come from that same thread.
    #[error("queue is bound to host thread {expected:?}, drain attempted from {actual:?}")]
    WrongThread {
        /// The thread the queue is bound to.
        expected: ThreadId,
        /// The thread that attempted the drain.
        actual: ThreadId,
    },

    /// A timed submission was requested after the scheduler shut down.
    #[error("scheduler is not running")]
    SchedulerStopped,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DispatchError>;
