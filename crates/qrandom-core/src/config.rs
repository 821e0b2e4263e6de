//! Pool configuration, captured once at construction.

use std::time::Duration;

use crate::error::{PoolError, PoolResult};

pub const API_URL_KEY: &str = "QRYPT_API_URL";
pub const API_TOKEN_KEY: &str = "QRYPT_API_TOKEN";
pub const STORE_SIZE_KEY: &str = "QRYPT_STORE_SIZE";
pub const MIN_THRESHOLD_KEY: &str = "QRYPT_STORE_MIN_THRESHOLD";

pub const DEFAULT_STORE_SIZE: usize = 1000;
pub const DEFAULT_MIN_THRESHOLD: usize = 200;

/// Delay before the first refill check.
pub const INITIAL_DELAY: Duration = Duration::from_secs(60);
/// Interval between refill checks.
pub const REFILL_PERIOD: Duration = Duration::from_secs(60);
/// How long `destroy()` waits for an in-flight refill before detaching.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);
/// Upper bound on a single HTTP fetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved settings for a [`BufferPool`](crate::BufferPool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Entropy service endpoint.
    pub api_url: String,
    /// Bearer token for the entropy service.
    pub api_token: String,
    /// Bytes requested per refill.
    pub store_size: usize,
    /// Refill when the queue holds this many bytes or fewer.
    pub min_threshold: usize,
}

impl PoolConfig {
    /// Resolve from the process environment.
    pub fn from_env() -> PoolResult<Self> {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve through an arbitrary key lookup.
    ///
    /// URL and token are required. Sizes fall back to their defaults when
    /// absent or not a valid integer.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> PoolResult<Self> {
        let api_url = required(&lookup, API_URL_KEY)?;
        let api_token = required(&lookup, API_TOKEN_KEY)?;
        let store_size = with_default(&lookup, STORE_SIZE_KEY, DEFAULT_STORE_SIZE);
        let min_threshold = with_default(&lookup, MIN_THRESHOLD_KEY, DEFAULT_MIN_THRESHOLD);

        Ok(Self {
            api_url,
            api_token,
            store_size,
            min_threshold,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> PoolResult<String> {
    lookup(key).ok_or(PoolError::MissingSetting { key })
}

fn with_default(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: usize) -> usize {
    match lookup(key) {
        None => default,
        // Sizes are 32-bit signed integers on the wire; anything else falls back.
        Some(raw) => match raw.parse::<i32>().ok().and_then(|v| usize::try_from(v).ok()) {
            Some(value) => value,
            None => {
                log::warn!("{key}={raw:?} is not a valid integer, using default {default}");
                default
            }
        },
    }
}

/// Timing of the background refill thread.
///
/// Production pools always use [`Schedule::default`]; other values are only
/// reachable through [`BufferPool::with_schedule`](crate::BufferPool::with_schedule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub period: Duration,
    pub shutdown_grace: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            period: REFILL_PERIOD,
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }
}
