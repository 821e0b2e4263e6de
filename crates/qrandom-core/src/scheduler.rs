//! Dedicated fixed-rate worker thread.
//!
//! Each pool owns exactly one [`Scheduler`], and a scheduler runs its task on
//! exactly one thread, so two refills can never overlap.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::Schedule;
use crate::error::{PoolError, PoolResult};

/// How a call to [`Scheduler::stop`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The thread exited within the grace period.
    Stopped,
    /// The thread was still busy when the grace period ran out and has been
    /// detached. It exits after its current tick without starting another.
    Detached,
}

/// Handle to a running fixed-rate task.
pub struct Scheduler {
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    /// Spawn `task` on a named thread, first running after
    /// `schedule.initial_delay` and then every `schedule.period`.
    ///
    /// Ticks are anchored to the start time. A tick that overruns its slot
    /// delays the next one rather than running concurrently with it.
    pub fn spawn<F>(name: &str, schedule: Schedule, mut task: F) -> PoolResult<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut next = Instant::now() + schedule.initial_delay;
                loop {
                    let wait = next.saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                    task();
                    next += schedule.period;
                }
                let _ = done_tx.send(());
            })
            .map_err(|e| PoolError::Runtime(format!("failed to spawn {name}: {e}")))?;

        Ok(Self {
            stop_tx,
            done_rx,
            handle,
        })
    }

    /// Ask the thread to stop without waiting for it.
    pub fn signal(&self) {
        let _ = self.stop_tx.send(());
    }

    /// Stop the thread, waiting at most `grace` for an in-flight tick.
    pub fn stop(self, grace: Duration) -> StopOutcome {
        self.signal();
        match self.done_rx.recv_timeout(grace) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = self.handle.join();
                StopOutcome::Stopped
            }
            Err(RecvTimeoutError::Timeout) => StopOutcome::Detached,
        }
    }
}
