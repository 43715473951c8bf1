//! `HostLoop`: a dedicated thread that drains an [`ActionQueue`] continuously.
//!
//! The primary embedding drives the queue externally, one
//! [`drain_once`](ActionQueue::drain_once) per frame tick. Collaborators that
//! own no frame cadence (network interfaces, standalone tools) use a
//! `HostLoop` instead: it parks when the queue is idle and wakes on submit.

use super::ActionQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// Upper bound on how long the loop sleeps before re-checking shutdown.
const PARK_TIMEOUT: Duration = Duration::from_millis(200);

/// A self-driving host thread for one queue.
///
/// The spawned thread becomes the queue's host thread, so the queue must not
/// have been drained elsewhere first. Pending items at shutdown are dropped
/// unexecuted.
pub struct HostLoop {
    /// Handle to the drain thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl HostLoop {
    /// Spawn the drain thread for `queue`.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(queue: Arc<ActionQueue>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("podium-host".to_owned())
            .spawn(move || {
                Self::run_loop(&queue, &shutdown_clone);
            })
            .expect("Failed to spawn host loop thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the drain thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Signal shutdown and wait for the drain thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main drain loop.
    fn run_loop(queue: &Arc<ActionQueue>, shutdown: &Arc<AtomicBool>) {
        debug!("host loop started");
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            match queue.drain_once() {
                Ok(0) => {
                    // Idle: park until a submit wakes us, bounded so the
                    // shutdown flag is still observed.
                    queue.wait_for_work(PARK_TIMEOUT);
                }
                Ok(_) => {}
                Err(err) => {
                    // The queue is bound to another thread. Nothing this
                    // loop does can recover that.
                    error!(error = %err, "host loop cannot drain its queue");
                    break;
                }
            }
        }
        debug!("host loop stopped");
    }
}

impl Drop for HostLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Action;
    use crossbeam_channel::bounded;
    use std::sync::Mutex;

    #[test]
    fn test_host_loop_executes_submitted_work() {
        let queue = Arc::new(ActionQueue::new());
        let host = HostLoop::spawn(Arc::clone(&queue));

        let (done_tx, done_rx) = bounded(1);
        queue.submit(Action::new("signal", move || {
            let _ = done_tx.send(());
        }));

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        host.join();
    }

    #[test]
    fn test_host_loop_preserves_submission_order() {
        let queue = Arc::new(ActionQueue::new());
        let host = HostLoop::spawn(Arc::clone(&queue));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = bounded(1);
        for i in 0..10 {
            let seen = Arc::clone(&seen);
            queue.submit(Action::new("record", move || {
                seen.lock().unwrap().push(i);
            }));
        }
        queue.submit(Action::new("signal", move || {
            let _ = done_tx.send(());
        }));

        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        assert_eq!(*seen.lock().unwrap(), (0..10).collect::<Vec<_>>());
        host.join();
    }

    #[test]
    fn test_host_loop_shutdown_stops_processing() {
        let queue = Arc::new(ActionQueue::new());
        let host = HostLoop::spawn(Arc::clone(&queue));
        host.join();

        // After join, nothing drains the queue any more.
        queue.submit(Action::from_fn(|| {}));
        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.len(), 1);
    }
}
