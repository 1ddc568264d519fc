use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Epoch-second time source. Injectable so TTL behavior is testable
/// without sleeping.
pub(crate) trait Clock: Send + Sync {
    /// Current time plus `ttl`, in whole seconds since the Unix epoch.
    fn epoch(&self, ttl: Duration) -> u64;

    /// Current time in whole seconds since the Unix epoch.
    fn timestamp(&self) -> u64;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn epoch(&self, ttl: Duration) -> u64 {
        self.timestamp().saturating_add(ttl.as_secs())
    }

    fn timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[cfg(test)]
pub(crate) struct ManualClock {
    now: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new(now: u64) -> Self {
        Self {
            now: std::sync::atomic::AtomicU64::new(now),
        }
    }

    pub(crate) fn advance(&self, secs: u64) {
        self.now
            .fetch_add(secs, std::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn epoch(&self, ttl: Duration) -> u64 {
        self.timestamp() + ttl.as_secs()
    }

    fn timestamp(&self) -> u64 {
        self.now.load(std::sync::atomic::Ordering::Relaxed)
    }
}
