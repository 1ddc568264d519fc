use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::config::CacheBuilder;
use crate::error::CacheError;
use crate::hash::KeyHasher;
use crate::shard::Shard;
use crate::stats::{ShardStats, Stats};

/// Nominal slot size used to turn a byte budget into a per-shard slot
/// count. The buffer capacity is a count of slots, not bytes.
const SLOT_SIZE: u64 = 32 * 1024;

/// TTL applied by [`Cache::set`].
const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Thread-safe sharded byte cache.
///
/// Keys are hashed to one of `shard_count` shards, each behind its own
/// `RwLock`, so operations on different shards never contend. The cache
/// is cheap to share: clone an `Arc<Cache>` or borrow it across scoped
/// threads. Dropping the last handle (or calling [`Cache::close`]) stops
/// the background sweeper.
pub struct Cache {
    inner: Arc<CacheInner>,
    close_tx: Sender<()>,
}

struct CacheInner {
    shards: Vec<RwLock<Shard>>,
    stats: Vec<Arc<ShardStats>>,
    hasher: Arc<dyn KeyHasher>,
    clock: Arc<dyn Clock>,
    mask: u64,
}

impl Cache {
    /// Start configuring a cache. See [`CacheBuilder`] for the options
    /// and their defaults.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    pub(crate) fn from_builder(builder: CacheBuilder) -> Result<Self, CacheError> {
        if !builder.shard_count.is_power_of_two() {
            return Err(CacheError::InvalidShardCount);
        }
        if builder.max_bytes == 0 {
            return Err(CacheError::InvalidMaxBytes);
        }

        let per_shard_bytes =
            (builder.max_bytes + builder.shard_count - 1) / builder.shard_count;
        let slot_capacity = ((per_shard_bytes + SLOT_SIZE - 1) / SLOT_SIZE) as usize;

        let shard_count = builder.shard_count as usize;
        let mut shards = Vec::with_capacity(shard_count);
        let mut stats = Vec::with_capacity(shard_count);
        for _ in 0..shard_count {
            let shard_stats = Arc::new(ShardStats::new(builder.stats_enabled));
            stats.push(Arc::clone(&shard_stats));
            shards.push(RwLock::new(Shard::new(
                slot_capacity,
                shard_stats,
                Arc::clone(&builder.clock),
            )));
        }

        let inner = Arc::new(CacheInner {
            shards,
            stats,
            hasher: builder.hasher,
            clock: builder.clock,
            mask: builder.shard_count - 1,
        });

        let (close_tx, close_rx) = unbounded();
        if builder.cleanup_enabled {
            let sweeper_inner = Arc::clone(&inner);
            let interval = builder.clean_interval;
            thread::Builder::new()
                .name("localcache-sweeper".into())
                .spawn(move || sweep_loop(sweeper_inner, interval, close_rx))
                .expect("spawn expiration sweeper thread");
        }

        Ok(Self { inner, close_tx })
    }

    fn shard_for(&self, hash: u64) -> &RwLock<Shard> {
        &self.inner.shards[(hash & self.inner.mask) as usize]
    }

    /// Store `value` under `key` with the default 10-minute TTL.
    ///
    /// Two distinct keys that hash to the same 64-bit value overwrite
    /// each other; `get` then reports the shadowed key as absent.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<(), CacheError> {
        self.set_with_ttl(key, value, DEFAULT_TTL)
    }

    /// Store `value` under `key`, expiring `ttl` from now. A zero `ttl`
    /// is rejected with `InvalidExpireTime`.
    pub fn set_with_ttl(
        &self,
        key: &[u8],
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let hash = self.inner.hasher.sum64(key);
        self.shard_for(hash).write().set(key, hash, value, ttl)
    }

    /// Look up `key`, returning a copy of the stored value.
    ///
    /// Takes the shard's write lock: the inner lookup removes expired
    /// entries on sight and updates the per-key hit map, both of which
    /// need `&mut` access.
    pub fn get(&self, key: &[u8]) -> Result<Bytes, CacheError> {
        let hash = self.inner.hasher.sum64(key);
        self.shard_for(hash).write().get(key, hash)
    }

    /// Remove `key`. Reports `NotFound` when nothing was stored.
    pub fn delete(&self, key: &[u8]) -> Result<(), CacheError> {
        let hash = self.inner.hasher.sum64(key);
        self.shard_for(hash).write().delete(hash)
    }

    /// Number of entries across all shards. Shards are read one at a
    /// time, so the sum may mix states from different instants.
    pub fn len(&self) -> usize {
        self.inner.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.shards.iter().all(|s| s.read().len() == 0)
    }

    /// Total slot capacity across all shards.
    pub fn capacity(&self) -> usize {
        self.inner.shards.iter().map(|s| s.read().capacity()).sum()
    }

    /// Aggregate statistics. Reads the shards' atomic counters without
    /// taking any lock; all zeros unless stats were enabled.
    pub fn stats(&self) -> Stats {
        let mut total = Stats::default();
        for stats in &self.inner.stats {
            let snap = stats.snapshot();
            total.hits += snap.hits;
            total.misses += snap.misses;
            total.del_hits += snap.del_hits;
            total.del_misses += snap.del_misses;
            total.collisions += snap.collisions;
        }
        total
    }

    /// Hit count recorded for `key`, or zero when stats are disabled.
    pub fn get_key_hit(&self, key: &[u8]) -> u64 {
        let hash = self.inner.hasher.sum64(key);
        self.shard_for(hash).write().key_hit(key)
    }

    /// Signal the background sweeper to stop. Safe to call more than
    /// once, and never waits for the sweeper to finish its current pass.
    /// Dropping the cache has the same effect.
    pub fn close(&self) {
        let _ = self.close_tx.send(());
    }
}

/// Periodically walks every shard and removes expired entries. Exits on
/// an explicit close signal or when every cache handle has been dropped.
/// The tick channel holds at most one pending tick, so passes that
/// overrun the interval are collapsed rather than replayed.
fn sweep_loop(inner: Arc<CacheInner>, interval: Duration, shutdown: Receiver<()>) {
    debug!(interval_ms = interval.as_millis() as u64, "expiration sweeper started");
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                let now = inner.clock.timestamp();
                let mut removed = 0;
                for shard in &inner.shards {
                    removed += shard.write().cleanup(now);
                }
                trace!(removed, "expiration sweep finished");
            }
            recv(shutdown) -> _ => {
                debug!("expiration sweeper stopped");
                return;
            }
        }
    }
}
