//! Millisecond time sources

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A millisecond-resolution time source
pub trait Clock: Send + Sync {
    /// Current time in milliseconds
    fn now_millis(&self) -> Result<u64>;
}

/// Milliseconds since the Unix epoch that never go backwards.
///
/// The wall clock is read once, at construction; later readings add the
/// elapsed time of a monotonic [`Instant`]. A wall-clock step (NTP
/// correction, manual change) after construction therefore has no effect on
/// the timestamps this clock reports.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    /// Wall-clock reading at `started`; `None` if the system time was
    /// before the epoch
    anchor_millis: Option<u64>,
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        let started = Instant::now();
        let anchor_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_millis() as u64);
        Self {
            anchor_millis,
            started,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> Result<u64> {
        let anchor = self
            .anchor_millis
            .ok_or_else(|| Error::Clock("system time is before the Unix epoch".into()))?;
        Ok(anchor + self.started.elapsed().as_millis() as u64)
    }
}

/// A settable clock for tests and deterministic replay.
///
/// Clones share the same underlying instant, so a test can keep one handle
/// and move another into a generator.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at `millis`
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Jump to an absolute instant (may move backwards)
    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Move forward by `by`
    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    /// Current reading without going through the trait
    pub fn get(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Result<u64> {
        Ok(self.get())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> Result<u64> {
        (**self).now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        let now = SystemClock::new().now_millis().unwrap();
        assert!(now > 1_577_836_800_000);
    }

    #[test]
    fn test_system_clock_never_goes_backwards() {
        let clock = SystemClock::new();
        let mut last = clock.now_millis().unwrap();
        for _ in 0..10_000 {
            let now = clock.now_millis().unwrap();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let before = clock.now_millis().unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert!(clock.now_millis().unwrap() >= before + 20);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let handle = clock.clone();

        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now_millis().unwrap(), 1_250);

        handle.set(10);
        assert_eq!(clock.now_millis().unwrap(), 10);
    }
}
