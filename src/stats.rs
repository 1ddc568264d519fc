use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of cache statistics, summed across all shards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Number of successful lookups.
    pub hits: u64,
    /// Number of lookups that found nothing.
    pub misses: u64,
    /// Number of deletes that removed an entry.
    #[serde(rename = "delete_hits")]
    pub del_hits: u64,
    /// Number of deletes that found nothing.
    #[serde(rename = "delete_misses")]
    pub del_misses: u64,
    /// Number of lookups that hit a same-hash entry for a different key.
    pub collisions: u64,
}

/// Per-shard counters. Updated atomically so the front-end can sum them
/// without taking any shard lock. Every update is a no-op unless stats
/// were enabled at construction.
pub(crate) struct ShardStats {
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    del_hits: AtomicU64,
    del_misses: AtomicU64,
    collisions: AtomicU64,
}

impl ShardStats {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            del_hits: AtomicU64::new(0),
            del_misses: AtomicU64::new(0),
            collisions: AtomicU64::new(0),
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn hit(&self) {
        if self.enabled {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn miss(&self) {
        if self.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn del_hit(&self) {
        if self.enabled {
            self.del_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn del_miss(&self) {
        if self.enabled {
            self.del_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn collision(&self) {
        if self.enabled {
            self.collisions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> Stats {
        Stats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            del_hits: self.del_hits.load(Ordering::Relaxed),
            del_misses: self.del_misses.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_when_enabled() {
        let stats = ShardStats::new(true);
        stats.hit();
        stats.hit();
        stats.miss();
        stats.del_hit();
        stats.del_miss();
        stats.collision();

        let snap = stats.snapshot();
        assert_eq!(snap.hits, 2);
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.del_hits, 1);
        assert_eq!(snap.del_misses, 1);
        assert_eq!(snap.collisions, 1);
    }

    #[test]
    fn updates_are_noops_when_disabled() {
        let stats = ShardStats::new(false);
        stats.hit();
        stats.miss();
        stats.del_hit();
        stats.del_miss();
        stats.collision();

        assert_eq!(stats.snapshot(), Stats::default());
        assert!(!stats.enabled());
    }
}
