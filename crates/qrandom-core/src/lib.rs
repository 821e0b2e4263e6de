//! # qrandom-core
//!
//! A process-local pool of pre-fetched random bytes, sourced from a remote
//! entropy service so that callers never pay a network round trip on the
//! hot path.
//!
//! ## Quick Start
//!
//! ```no_run
//! // Reads QRYPT_API_URL / QRYPT_API_TOKEN (+ optional sizing) from the environment.
//! let pool = qrandom_core::get_instance().expect("pool configuration");
//!
//! // Non-blocking: may return fewer bytes than requested.
//! let bytes = pool.get_bytes(32);
//! if bytes.len() < 32 {
//!     eprintln!("pool is running low ({} bytes served)", bytes.len());
//! }
//! ```
//!
//! ## Architecture
//!
//! Remote service → [`EntropySource`] → refill thread → [`ByteQueue`] → `get_bytes`
//!
//! A single dedicated thread per pool wakes on a fixed period. If the queue
//! holds `min_threshold` bytes or fewer it requests `store_size` bytes from
//! the source and appends them in order. Fetch failures are logged and the
//! schedule carries on; consumers only ever observe a shorter queue.

pub mod config;
pub mod error;
pub mod instance;
pub mod pool;
pub mod queue;
pub mod remote;
pub mod scheduler;
pub mod source;

pub use config::{PoolConfig, Schedule};
pub use error::{PoolError, PoolResult, SourceError};
pub use instance::{get_instance, get_instance_with, shutdown};
pub use pool::{BufferPool, PoolStats, RandomStore};
pub use queue::ByteQueue;
pub use remote::HttpEntropySource;
pub use source::EntropySource;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
