//! Abstract remote entropy provider.
//!
//! The pool only needs one capability from its provider: "give me up to N
//! random bytes, or fail". Real network clients and test doubles implement
//! [`EntropySource`] and are interchangeable.

use crate::error::SourceError;

/// Trait that every entropy provider must implement.
pub trait EntropySource: Send + Sync {
    /// Short identifier used in log lines.
    fn name(&self) -> &str {
        "entropy_source"
    }

    /// Fetch up to `count` random bytes.
    ///
    /// Called from the pool's refill thread only, never from a consumer.
    /// Blocking is fine: a slow fetch delays the next tick, not `get_bytes`.
    fn fetch(&self, count: usize) -> Result<Vec<u8>, SourceError>;
}
