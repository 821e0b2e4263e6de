//! Pre-fetched random byte pool with threshold-triggered refill.
//!
//! Architecture:
//! 1. Consumers drain the shared [`ByteQueue`] through [`BufferPool::get_bytes`]
//!    without ever touching the network
//! 2. One dedicated thread wakes on a fixed period and checks the fill level
//! 3. At or below `min_threshold` it fetches `store_size` bytes and appends them
//! 4. Fetch failures (including panics) are logged and counted, never propagated
//!
//! Only the refill thread appends to the queue. The threshold check and the
//! append therefore need no lock of their own; the queue is synchronized
//! internally for the consumers that drain it concurrently.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{PoolConfig, Schedule};
use crate::error::PoolResult;
use crate::queue::ByteQueue;
use crate::remote::HttpEntropySource;
use crate::scheduler::{Scheduler, StopOutcome};
use crate::source::EntropySource;

const REFILL_THREAD_NAME: &str = "qrandom-refill";

/// Consumption contract shared by random byte stores.
pub trait RandomStore: Send + Sync {
    /// Remove and return up to `num_bytes` bytes. Never blocks; a result
    /// shorter than requested means the store ran low.
    fn get_bytes(&self, num_bytes: usize) -> Vec<u8>;

    /// Stop background replenishment. Bytes already stored stay retrievable.
    fn destroy(&self);
}

/// State shared between the pool handle and its refill thread.
struct Shared {
    queue: ByteQueue,
    source: Arc<dyn EntropySource>,
    store_size: usize,
    min_threshold: usize,
    refills: AtomicU64,
    failed_refills: AtomicU64,
    skipped_ticks: AtomicU64,
    bytes_fetched: AtomicU64,
    bytes_served: AtomicU64,
}

/// Outcome of one scheduled check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Queue was above the threshold; the source was not called.
    Skipped,
    /// Source returned this many bytes, all appended.
    Refilled(usize),
    /// Source failed or panicked.
    Failed,
}

impl Shared {
    fn refill_tick(&self) -> Tick {
        let queued = self.queue.len();
        if queued > self.min_threshold {
            self.skipped_ticks.fetch_add(1, Ordering::Relaxed);
            return Tick::Skipped;
        }

        log::info!(
            "refill: queue at {queued} bytes (<= {}), fetching {} from {}",
            self.min_threshold,
            self.store_size,
            self.source.name()
        );

        let fetched = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.source.fetch(self.store_size)
        }));

        match fetched {
            Ok(Ok(bytes)) => {
                self.queue.push_all(&bytes);
                self.refills.fetch_add(1, Ordering::Relaxed);
                self.bytes_fetched
                    .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                log::info!("refill: appended {} bytes", bytes.len());
                Tick::Refilled(bytes.len())
            }
            Ok(Err(e)) => {
                self.failed_refills.fetch_add(1, Ordering::Relaxed);
                log::error!("refill: fetch from {} failed: {e}", self.source.name());
                Tick::Failed
            }
            Err(_) => {
                self.failed_refills.fetch_add(1, Ordering::Relaxed);
                log::error!("refill: {} panicked during fetch", self.source.name());
                Tick::Failed
            }
        }
    }
}

/// Thread-safe pool of pre-fetched random bytes.
///
/// Operational as soon as a constructor returns, even while the queue is
/// still empty. Dropping the pool signals the refill thread to stop; call
/// [`destroy`](Self::destroy) to also wait for it.
pub struct BufferPool {
    shared: Arc<Shared>,
    scheduler: Mutex<Option<Scheduler>>,
    shutdown_grace: Duration,
}

impl BufferPool {
    /// Build a pool backed by the HTTP entropy service described in `config`.
    pub fn from_config(config: &PoolConfig) -> PoolResult<Self> {
        let source = HttpEntropySource::new(&config.api_url, &config.api_token)?;
        Self::with_schedule(
            Arc::new(source),
            config.store_size,
            config.min_threshold,
            Schedule::default(),
        )
    }

    /// Independent pool over an explicit source, using the default schedule.
    pub fn with_source(
        source: Arc<dyn EntropySource>,
        store_size: usize,
        min_threshold: usize,
    ) -> PoolResult<Self> {
        Self::with_schedule(source, store_size, min_threshold, Schedule::default())
    }

    /// Independent pool over an explicit source and schedule.
    pub fn with_schedule(
        source: Arc<dyn EntropySource>,
        store_size: usize,
        min_threshold: usize,
        schedule: Schedule,
    ) -> PoolResult<Self> {
        log::info!(
            "initializing random pool (store_size={store_size}, min_threshold={min_threshold}, source={})",
            source.name()
        );

        let shared = Arc::new(Shared {
            queue: ByteQueue::new(),
            source,
            store_size,
            min_threshold,
            refills: AtomicU64::new(0),
            failed_refills: AtomicU64::new(0),
            skipped_ticks: AtomicU64::new(0),
            bytes_fetched: AtomicU64::new(0),
            bytes_served: AtomicU64::new(0),
        });

        let worker = Arc::clone(&shared);
        let scheduler = Scheduler::spawn(REFILL_THREAD_NAME, schedule, move || {
            worker.refill_tick();
        })?;

        Ok(Self {
            shared,
            scheduler: Mutex::new(Some(scheduler)),
            shutdown_grace: schedule.shutdown_grace,
        })
    }

    /// Remove up to `num_bytes` bytes from the front of the queue.
    ///
    /// Never blocks and never fails. Callers must check the returned length:
    /// a short (or empty) result means the queue ran low.
    pub fn get_bytes(&self, num_bytes: usize) -> Vec<u8> {
        let out = self.shared.queue.take_up_to(num_bytes);
        self.shared
            .bytes_served
            .fetch_add(out.len() as u64, Ordering::Relaxed);
        out
    }

    /// Stop the refill thread and release it.
    ///
    /// Waits up to the schedule's shutdown grace for an in-flight refill;
    /// past that the thread is detached and exits once its fetch returns.
    /// Queued bytes stay retrievable. Repeated calls are no-ops.
    pub fn destroy(&self) {
        let scheduler = self
            .scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(scheduler) = scheduler else {
            log::debug!("random pool already shut down");
            return;
        };

        log::info!("random pool scheduler shutdown...");
        match scheduler.stop(self.shutdown_grace) {
            StopOutcome::Stopped => log::info!("random pool scheduler stopped"),
            StopOutcome::Detached => log::warn!(
                "refill still running after {:?}; detaching scheduler thread",
                self.shutdown_grace
            ),
        }
    }

    /// Whether background replenishment is still active.
    pub fn is_running(&self) -> bool {
        self.scheduler
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Bytes currently queued.
    pub fn available(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn store_size(&self) -> usize {
        self.shared.store_size
    }

    pub fn min_threshold(&self) -> usize {
        self.shared.min_threshold
    }

    /// Point-in-time counters for monitoring.
    pub fn stats(&self) -> PoolStats {
        let s = &self.shared;
        PoolStats {
            queued: s.queue.len(),
            refills: s.refills.load(Ordering::Relaxed),
            failed_refills: s.failed_refills.load(Ordering::Relaxed),
            skipped_ticks: s.skipped_ticks.load(Ordering::Relaxed),
            bytes_fetched: s.bytes_fetched.load(Ordering::Relaxed),
            bytes_served: s.bytes_served.load(Ordering::Relaxed),
            running: self.is_running(),
        }
    }

    /// Run one refill check on the calling thread.
    #[cfg(test)]
    pub(crate) fn refill_tick(&self) -> Tick {
        self.shared.refill_tick()
    }

    #[cfg(test)]
    fn preload(&self, bytes: &[u8]) {
        self.shared.queue.push_all(bytes);
    }
}

impl RandomStore for BufferPool {
    fn get_bytes(&self, num_bytes: usize) -> Vec<u8> {
        BufferPool::get_bytes(self, num_bytes)
    }

    fn destroy(&self) {
        BufferPool::destroy(self)
    }
}

impl Drop for BufferPool {
    fn drop(&mut self) {
        let scheduler = self
            .scheduler
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(scheduler) = scheduler {
            scheduler.signal();
        }
    }
}

/// Counters describing a pool's activity since construction.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PoolStats {
    /// Bytes currently queued.
    pub queued: usize,
    /// Successful refills.
    pub refills: u64,
    /// Refills whose fetch failed.
    pub failed_refills: u64,
    /// Checks that found the queue above the threshold.
    pub skipped_ticks: u64,
    /// Total bytes appended by refills.
    pub bytes_fetched: u64,
    /// Total bytes handed out by `get_bytes`.
    pub bytes_served: u64,
    /// Whether the refill thread is still scheduled.
    pub running: bool,
}
