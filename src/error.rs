use thiserror::Error;

/// Errors surfaced by the public cache API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    /// Construction-time: `shard_count` was not a power of two.
    #[error("shard count must be a power of two")]
    InvalidShardCount,

    /// Construction-time: `max_bytes` was zero.
    #[error("max bytes must be greater than zero")]
    InvalidMaxBytes,

    /// A zero TTL was passed to `set_with_ttl`.
    #[error("entry expire time must be greater than zero")]
    InvalidExpireTime,

    /// The key is absent, expired, or shadowed by a same-hash collision.
    #[error("entry not found")]
    NotFound,
}

/// Internal slot-buffer errors. `BufferFull` is consumed by the shard's
/// eviction loop; a failed `get` degrades to a `NotFound` miss. Neither
/// crosses the shard boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BufferError {
    #[error("slot id out of range")]
    OutOfBounds,

    #[error("buffer full")]
    BufferFull,
}
