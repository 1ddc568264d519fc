use std::hash::Hasher;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

/// Maps an opaque key to the 64-bit hash used for shard routing and
/// index lookup. Implementations must be deterministic for the lifetime
/// of the cache.
pub trait KeyHasher: Send + Sync {
    fn sum64(&self, key: &[u8]) -> u64;
}

/// FNV-1a 64. The default hash function.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fnv64;

impl KeyHasher for Fnv64 {
    fn sum64(&self, key: &[u8]) -> u64 {
        let mut hasher = fnv::FnvHasher::default();
        hasher.write(key);
        hasher.finish()
    }
}

/// djb2-style times-33 hash with a random 64-bit seed.
///
/// `d = 5381 + seed + len`, then `d = (d * 33) ^ b` for every key byte,
/// finally `d ^ (d >> 16)`.
#[derive(Clone, Copy, Debug)]
pub struct Djb33 {
    seed: u64,
}

impl Djb33 {
    /// Seed from the operating system CSPRNG. If that source fails, warn
    /// and degrade to a non-secure 32-bit seed derived from the clock.
    pub fn new() -> Self {
        let mut buf = [0u8; 8];
        let seed = match getrandom::getrandom(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(err) => {
                warn!(
                    error = %err,
                    "system CSPRNG unavailable, continuing with a non-secure djb33 seed"
                );
                fallback_seed()
            }
        };
        Self { seed }
    }

    /// Fixed seed, for reproducible hashing.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for Djb33 {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHasher for Djb33 {
    fn sum64(&self, key: &[u8]) -> u64 {
        let mut d = 5381u64
            .wrapping_add(self.seed)
            .wrapping_add(key.len() as u64);
        for &b in key {
            d = d.wrapping_mul(33) ^ u64::from(b);
        }
        d ^ (d >> 16)
    }
}

fn fallback_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv64a_known_vectors() {
        let fnv = Fnv64;
        assert_eq!(fnv.sum64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv.sum64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv.sum64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn djb33_is_deterministic_per_seed() {
        let a = Djb33::with_seed(7);
        let b = Djb33::with_seed(7);
        assert_eq!(a.sum64(b"asong"), b.sum64(b"asong"));

        let c = Djb33::with_seed(8);
        assert_ne!(a.sum64(b"asong"), c.sum64(b"asong"));
    }

    #[test]
    fn djb33_folds_every_byte() {
        let h = Djb33::with_seed(0);
        // Keys differing only in their final byte must hash differently.
        assert_ne!(h.sum64(b"abcx"), h.sum64(b"abcy"));
        assert_ne!(h.sum64(b"x"), h.sum64(b"y"));
    }

    #[test]
    fn djb33_matches_reference_formula() {
        let h = Djb33::with_seed(11);
        let mut d = 5381u64 + 11 + 2;
        for &b in b"ab" {
            d = d.wrapping_mul(33) ^ u64::from(b);
        }
        assert_eq!(h.sum64(b"ab"), d ^ (d >> 16));
    }

    #[test]
    fn collision_rate_over_random_keys_is_low() {
        use rand::{distributions::Alphanumeric, Rng, SeedableRng};
        use std::collections::HashMap;

        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let fnv = Fnv64;
        let mut seen: HashMap<u64, Vec<u8>> = HashMap::new();
        let mut collisions = 0;
        for _ in 0..100_000 {
            let len = rng.gen_range(1..16);
            let key: Vec<u8> = (&mut rng).sample_iter(&Alphanumeric).take(len).collect();
            let sum = fnv.sum64(&key);
            match seen.get(&sum) {
                Some(existing) if *existing != key => collisions += 1,
                _ => {
                    seen.insert(sum, key);
                }
            }
        }
        assert!(collisions < 10, "unexpected collision count {collisions}");
    }
}
