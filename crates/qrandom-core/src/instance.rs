//! Process-wide pool instance.
//!
//! The shared pool is created lazily on first access. Initialization is
//! double-checked: a lock-free read of the published instance, then a
//! mutex-guarded re-check before constructing. Only a fully built pool is
//! ever published, and a failed construction publishes nothing, so a later
//! call can retry once the configuration is fixed.

use std::sync::{Arc, Mutex, OnceLock};

use crate::config::PoolConfig;
use crate::error::PoolResult;
use crate::pool::BufferPool;

static INSTANCE: OnceLock<Arc<BufferPool>> = OnceLock::new();
static INIT_GATE: Mutex<()> = Mutex::new(());

/// Return the shared pool, building it from the environment on first call.
pub fn get_instance() -> PoolResult<Arc<BufferPool>> {
    get_instance_with(|key| std::env::var(key).ok())
}

/// Return the shared pool, resolving configuration through `lookup` if it
/// has not been created yet. Once created, `lookup` is never consulted.
pub fn get_instance_with(lookup: impl Fn(&str) -> Option<String>) -> PoolResult<Arc<BufferPool>> {
    init_once(&INSTANCE, &INIT_GATE, || {
        let config = PoolConfig::resolve(lookup)?;
        BufferPool::from_config(&config)
    })
}

/// Destroy the shared pool if it was ever created.
///
/// The instance stays published: later [`get_instance`] calls return the
/// same, now idle, pool with whatever bytes it still holds.
pub fn shutdown() {
    if let Some(pool) = INSTANCE.get() {
        pool.destroy();
    }
}

fn init_once<T>(
    cell: &OnceLock<Arc<T>>,
    gate: &Mutex<()>,
    build: impl FnOnce() -> PoolResult<T>,
) -> PoolResult<Arc<T>> {
    if let Some(existing) = cell.get() {
        return Ok(Arc::clone(existing));
    }

    let _guard = gate.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = cell.get() {
        return Ok(Arc::clone(existing));
    }

    let built = Arc::new(build()?);
    Ok(Arc::clone(cell.get_or_init(|| built)))
}
