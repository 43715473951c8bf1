//! `Scheduler`: timed and repeating submission into an [`ActionQueue`].
//!
//! The scheduler thread owns the pending deadlines and fires due entries by
//! submitting into the queue — it is just another producer and never
//! executes handlers itself. Handlers still run on the host thread, in
//! queue order.

use super::{Action, ActionQueue};
use crate::error::{DispatchError, Result};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Upper bound on how long the timer thread sleeps with nothing due.
const IDLE_WAIT: Duration = Duration::from_millis(200);

/// Identifies a scheduled entry for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Commands sent to the timer thread.
enum TimerCommand {
    Schedule(Entry),
    Cancel(TimerId),
    Pause,
    Resume,
    Shutdown,
}

/// One pending deadline.
struct Entry {
    id: TimerId,
    label: &'static str,
    deadline: Instant,
    kind: EntryKind,
}

enum EntryKind {
    /// Fires once, then the entry is reaped.
    Once(Option<Action>),
    /// Re-fires every `interval`; `remaining` of `None` means unbounded.
    Repeating {
        interval: Duration,
        remaining: Option<u64>,
        tick: Arc<dyn Fn() + Send + Sync>,
    },
}

impl Entry {
    /// Fire the entry into the queue. Returns `true` if it is exhausted
    /// and should be reaped.
    fn fire(&mut self, queue: &ActionQueue, now: Instant) -> bool {
        trace!(id = self.id.0, item = self.label, "timer fired");
        match &mut self.kind {
            EntryKind::Once(action) => {
                if let Some(action) = action.take() {
                    queue.submit(action);
                }
                true
            }
            EntryKind::Repeating {
                interval,
                remaining,
                tick,
            } => {
                if *remaining == Some(0) {
                    return true;
                }
                let tick = Arc::clone(tick);
                queue.submit(Action::new(self.label, move || tick()));
                if let Some(n) = remaining {
                    *n -= 1;
                    if *n == 0 {
                        return true;
                    }
                }
                self.deadline += *interval;
                // Behind schedule: re-anchor instead of firing a burst.
                if self.deadline < now {
                    self.deadline = now + *interval;
                }
                false
            }
        }
    }
}

/// Timer thread that feeds delayed and repeating work into one queue.
///
/// Pausing holds every pending deadline; resuming shifts them by the pause
/// duration so relative timing is preserved.
pub struct Scheduler {
    cmd_tx: Sender<TimerCommand>,
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    next_id: AtomicU64,
}

impl Scheduler {
    /// Spawn the timer thread feeding `queue`.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(queue: Arc<ActionQueue>) -> Self {
        let (cmd_tx, cmd_rx) = unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("podium-timer".to_owned())
            .spawn(move || {
                Self::run_loop(&queue, &cmd_rx, &shutdown_clone);
            })
            .expect("Failed to spawn scheduler thread");

        Self {
            cmd_tx,
            handle: Some(handle),
            shutdown,
            next_id: AtomicU64::new(0),
        }
    }

    /// Submit `action` to the queue after `delay`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::SchedulerStopped`] if the scheduler has shut down.
    pub fn schedule_once(&self, delay: Duration, action: Action) -> Result<TimerId> {
        let id = self.alloc_id()?;
        let entry = Entry {
            id,
            label: action.label(),
            deadline: Instant::now() + delay,
            kind: EntryKind::Once(Some(action)),
        };
        self.send(TimerCommand::Schedule(entry))?;
        Ok(id)
    }

    /// Submit `tick` to the queue after `delay`, then every `interval`.
    ///
    /// `iterations` bounds the number of firings; `None` repeats until
    /// cancelled or the scheduler shuts down.
    ///
    /// # Errors
    ///
    /// [`DispatchError::SchedulerStopped`] if the scheduler has shut down.
    pub fn schedule_repeating(
        &self,
        label: &'static str,
        delay: Duration,
        interval: Duration,
        iterations: Option<u64>,
        tick: impl Fn() + Send + Sync + 'static,
    ) -> Result<TimerId> {
        let id = self.alloc_id()?;
        let entry = Entry {
            id,
            label,
            deadline: Instant::now() + delay,
            kind: EntryKind::Repeating {
                interval,
                remaining: iterations,
                tick: Arc::new(tick),
            },
        };
        self.send(TimerCommand::Schedule(entry))?;
        Ok(id)
    }

    /// Cancel a scheduled entry. Unknown or already-fired ids are a no-op.
    pub fn cancel(&self, id: TimerId) {
        let _ = self.cmd_tx.send(TimerCommand::Cancel(id));
    }

    /// Hold every pending deadline.
    pub fn pause(&self) {
        let _ = self.cmd_tx.send(TimerCommand::Pause);
    }

    /// Release held deadlines, shifted by the pause duration.
    pub fn resume(&self) {
        let _ = self.cmd_tx.send(TimerCommand::Resume);
    }

    /// Signal the timer thread to shut down. Pending entries never fire.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.cmd_tx.send(TimerCommand::Shutdown);
    }

    /// Signal shutdown and wait for the timer thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn alloc_id(&self) -> Result<TimerId> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(DispatchError::SchedulerStopped);
        }
        Ok(TimerId(self.next_id.fetch_add(1, Ordering::Relaxed)))
    }

    fn send(&self, command: TimerCommand) -> Result<()> {
        self.cmd_tx
            .send(command)
            .map_err(|_| DispatchError::SchedulerStopped)
    }

    /// Timer thread body: wait for the next deadline or command, fire due
    /// entries, reap exhausted ones.
    fn run_loop(
        queue: &Arc<ActionQueue>,
        cmd_rx: &Receiver<TimerCommand>,
        shutdown: &Arc<AtomicBool>,
    ) {
        debug!("scheduler started");
        let mut entries: Vec<Entry> = Vec::new();
        let mut paused_at: Option<Instant> = None;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            let timeout = if paused_at.is_some() {
                IDLE_WAIT
            } else {
                let now = Instant::now();
                entries
                    .iter()
                    .map(|e| e.deadline.saturating_duration_since(now))
                    .min()
                    .unwrap_or(IDLE_WAIT)
            };

            match cmd_rx.recv_timeout(timeout) {
                Ok(TimerCommand::Schedule(entry)) => {
                    trace!(id = entry.id.0, item = entry.label, "timer scheduled");
                    entries.push(entry);
                }
                Ok(TimerCommand::Cancel(id)) => {
                    entries.retain(|e| e.id != id);
                }
                Ok(TimerCommand::Pause) => {
                    if paused_at.is_none() {
                        paused_at = Some(Instant::now());
                    }
                }
                Ok(TimerCommand::Resume) => {
                    if let Some(at) = paused_at.take() {
                        let shift = at.elapsed();
                        for entry in &mut entries {
                            entry.deadline += shift;
                        }
                    }
                }
                Ok(TimerCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }

            if paused_at.is_none() {
                Self::fire_due(queue, &mut entries);
            }
        }
        debug!("scheduler stopped");
    }

    fn fire_due(queue: &Arc<ActionQueue>, entries: &mut Vec<Entry>) {
        let now = Instant::now();
        let mut i = 0;
        while i < entries.len() {
            if entries[i].deadline <= now && entries[i].fire(queue, now) {
                entries.swap_remove(i);
                continue;
            }
            i += 1;
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
