//! In-process sharded byte cache with bounded memory and TTL expiration.
//!
//! Keys are routed to one of N independently locked shards by a 64-bit
//! hash. Each shard stores length-prefixed, timestamped entries in a
//! fixed-capacity slot buffer and evicts in approximate FIFO order when
//! space runs out. Expired entries are dropped lazily on read and,
//! optionally, by a background sweeper thread.
//!
//! ```no_run
//! use localcache::Cache;
//! use std::time::Duration;
//!
//! let cache = Cache::builder().build().unwrap();
//! cache.set(b"user:42", b"payload").unwrap();
//! assert_eq!(&cache.get(b"user:42").unwrap()[..], b"payload");
//! cache.set_with_ttl(b"session", b"token", Duration::from_secs(30)).unwrap();
//! cache.close();
//! ```

mod buffer;
mod cache;
mod clock;
mod config;
mod entry;
mod error;
mod hash;
mod shard;
mod stats;

pub use cache::Cache;
pub use config::CacheBuilder;
pub use error::CacheError;
pub use hash::{Djb33, Fnv64, KeyHasher};
pub use stats::Stats;
