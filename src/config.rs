use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::clock::{Clock, SystemClock};
use crate::error::CacheError;
use crate::hash::{Fnv64, KeyHasher};

const DEFAULT_SHARD_COUNT: u64 = 256;
const DEFAULT_MAX_BYTES: u64 = 512 * 1024 * 1024;
const DEFAULT_CLEAN_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Configures and constructs a [`Cache`].
///
/// ```no_run
/// use localcache::{Cache, Djb33};
/// use std::time::Duration;
///
/// let cache = Cache::builder()
///     .shard_count(64)
///     .max_bytes(64 * 1024 * 1024)
///     .hasher(Djb33::new())
///     .clean_interval(Duration::from_secs(60))
///     .cleanup_enabled(true)
///     .build()
///     .unwrap();
/// # drop(cache);
/// ```
pub struct CacheBuilder {
    pub(crate) hasher: Arc<dyn KeyHasher>,
    pub(crate) shard_count: u64,
    pub(crate) max_bytes: u64,
    pub(crate) clean_interval: Duration,
    pub(crate) stats_enabled: bool,
    pub(crate) cleanup_enabled: bool,
    pub(crate) clock: Arc<dyn Clock>,
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Arc::new(Fnv64),
            shard_count: DEFAULT_SHARD_COUNT,
            max_bytes: DEFAULT_MAX_BYTES,
            clean_interval: DEFAULT_CLEAN_INTERVAL,
            stats_enabled: false,
            cleanup_enabled: false,
            clock: Arc::new(SystemClock),
        }
    }

    /// Hash function used for shard routing and index lookup.
    pub fn hasher(mut self, hasher: impl KeyHasher + 'static) -> Self {
        self.hasher = Arc::new(hasher);
        self
    }

    /// Number of independently locked shards. Must be a power of two.
    pub fn shard_count(mut self, count: u64) -> Self {
        self.shard_count = count;
        self
    }

    /// Aggregate nominal capacity in bytes, split evenly across shards.
    pub fn max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Period of the background expiration sweeper.
    pub fn clean_interval(mut self, interval: Duration) -> Self {
        self.clean_interval = interval;
        self
    }

    /// Whether hit/miss/delete/collision counters update.
    pub fn stats_enabled(mut self, enabled: bool) -> Self {
        self.stats_enabled = enabled;
        self
    }

    /// Whether the background sweeper thread is spawned.
    pub fn cleanup_enabled(mut self, enabled: bool) -> Self {
        self.cleanup_enabled = enabled;
        self
    }

    #[cfg(test)]
    pub(crate) fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate the configuration and construct the cache.
    pub fn build(self) -> Result<Cache, CacheError> {
        Cache::from_builder(self)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
