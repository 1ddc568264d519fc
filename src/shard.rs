use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::buffer::SlotBuffer;
use crate::clock::Clock;
use crate::entry;
use crate::error::CacheError;
use crate::stats::ShardStats;

/// One lock's worth of cache state: the hash index, the slot buffer, and
/// the eviction order, kept consistent by routing every mutation through
/// `&mut self`. The enclosing `RwLock` provides thread safety.
///
/// `evict_order` holds slot ids, newest at the front. Lazy expiration and
/// explicit deletes vacate the slot but leave its id in the order, and
/// once the slot is reused that stale id aliases the new occupant. An
/// eviction that pops such an id removes the aliased entry, so under
/// expiry- or delete-heavy load the victim can be a live entry newer
/// than the true FIFO-oldest one. Entries never leak and the three
/// structures stay consistent; what is lost is the eviction-order
/// guarantee for the aliased entry.
///
/// Key identity is hash equality: two distinct keys sharing a hash
/// overwrite each other on `set`, and `get` detects the mismatch by
/// comparing the stored key bytes.
pub(crate) struct Shard {
    index: HashMap<u64, u32>,
    buffer: SlotBuffer,
    evict_order: VecDeque<u32>,
    key_hits: HashMap<Vec<u8>, u64>,
    stats: Arc<ShardStats>,
    clock: Arc<dyn Clock>,
}

impl Shard {
    pub(crate) fn new(
        slot_capacity: usize,
        stats: Arc<ShardStats>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut buffer = SlotBuffer::new(slot_capacity);
        buffer.reset();
        Self {
            index: HashMap::new(),
            buffer,
            evict_order: VecDeque::new(),
            key_hits: HashMap::new(),
            stats,
            clock,
        }
    }

    /// Insert or overwrite the entry for `hash`. Evicts from the back of
    /// the FIFO order until the buffer has room for the new entry.
    pub(crate) fn set(
        &mut self,
        key: &[u8],
        hash: u64,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidExpireTime);
        }
        let expire_at = self.clock.epoch(ttl);

        if let Some(prev) = self.index.remove(&hash) {
            let _ = self.buffer.remove(prev);
            if let Some(pos) = self.evict_order.iter().position(|&id| id == prev) {
                self.evict_order.remove(pos);
            }
        }

        while self.buffer.len() == self.buffer.capacity() {
            self.evict_oldest();
        }
        let blob = entry::wrap_entry(expire_at, hash, key, value);
        match self.buffer.push(blob) {
            Ok(id) => {
                self.index.insert(hash, id);
                self.evict_order.push_front(id);
                Ok(())
            }
            // A buffer below capacity always accepts a push.
            Err(_) => unreachable!(),
        }
    }

    /// Drop the entry at the back of the FIFO order, cleaning its index
    /// mapping via the hash embedded in the blob. The popped id may be a
    /// stale leftover from lazy expiration or delete; when its slot has
    /// been reused it names a live entry, and that entry is what gets
    /// evicted, not the true oldest. A popped id whose slot is still
    /// vacant removes nothing.
    fn evict_oldest(&mut self) {
        let oldest = match self.evict_order.pop_back() {
            Some(id) => id,
            // A full buffer always has live slots in the eviction order.
            None => unreachable!("buffer full with empty eviction order"),
        };
        if let Ok(Some(blob)) = self.buffer.get(oldest) {
            let victim = entry::read_hash(blob);
            self.index.remove(&victim);
        }
        let _ = self.buffer.remove(oldest);
    }

    /// Look up `key`. Expired entries are removed on sight and reported
    /// as absent without counting a hit or a miss.
    pub(crate) fn get(&mut self, key: &[u8], hash: u64) -> Result<Bytes, CacheError> {
        let now = self.clock.timestamp();

        let Some(&id) = self.index.get(&hash) else {
            self.stats.miss();
            return Err(CacheError::NotFound);
        };
        let blob = match self.buffer.get(id) {
            Ok(Some(blob)) => blob,
            _ => {
                self.stats.miss();
                return Err(CacheError::NotFound);
            }
        };
        if entry::read_key(blob) != key {
            // Another key occupies this hash. Leave the entry in place.
            self.stats.collision();
            return Err(CacheError::NotFound);
        }
        if now >= entry::read_expire_at(blob) {
            let _ = self.buffer.remove(id);
            self.index.remove(&hash);
            return Err(CacheError::NotFound);
        }

        let value = Bytes::copy_from_slice(entry::read_value(blob));
        self.stats.hit();
        if self.stats.enabled() {
            *self.key_hits.entry(key.to_vec()).or_insert(0) += 1;
        }
        Ok(value)
    }

    pub(crate) fn delete(&mut self, hash: u64) -> Result<(), CacheError> {
        let Some(id) = self.index.remove(&hash) else {
            self.stats.del_miss();
            return Err(CacheError::NotFound);
        };
        let _ = self.buffer.remove(id);
        self.stats.del_hit();
        Ok(())
    }

    /// Remove every entry whose expiry is at or before `now`. Returns the
    /// number of entries removed.
    pub(crate) fn cleanup(&mut self, now: u64) -> usize {
        let mut removed = 0;
        for id in self.buffer.occupied_ids() {
            let expired = match self.buffer.get(id) {
                Ok(Some(blob)) if now >= entry::read_expire_at(blob) => {
                    Some(entry::read_hash(blob))
                }
                _ => None,
            };
            if let Some(hash) = expired {
                self.index.remove(&hash);
                let _ = self.buffer.remove(id);
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub(crate) fn key_hit(&self, key: &[u8]) -> u64 {
        self.key_hits.get(key).copied().unwrap_or(0)
    }
}
