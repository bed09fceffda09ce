//! Rate-limited reporting of events discarded after failed submissions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::clock::SharedClock;

/// Default interval between warnings about discarded events.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Aggregates discarded-event counts into periodic warnings.
///
/// Callers add to the counter with [`record_drops`]. [`warn_if_due`] hands
/// the accumulated count to its callback when no warning has been emitted
/// within the interval, measured on the warner's clock. [`flush`] reports
/// any pending count unconditionally.
///
/// [`record_drops`]: RateLimitedWarner::record_drops
/// [`warn_if_due`]: RateLimitedWarner::warn_if_due
/// [`flush`]: RateLimitedWarner::flush
#[derive(Debug)]
pub struct RateLimitedWarner {
    dropped: AtomicU64,
    last_warn: Mutex<Option<SystemTime>>,
    interval: Duration,
    clock: SharedClock,
}

impl RateLimitedWarner {
    /// Create a warner whose first warning is emitted immediately.
    pub fn new(interval: Duration, clock: SharedClock) -> Self {
        Self {
            dropped: AtomicU64::new(0),
            last_warn: Mutex::new(None),
            interval,
            clock,
        }
    }

    /// Add `count` discarded events to the pending total.
    pub fn record_drops(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
    }

    /// Events discarded since the last warning.
    pub fn pending(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Report the pending count if the interval has elapsed.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let now = self.clock.now();
        let mut last = self.last_warn.lock();
        let due = last.is_none_or(|prev| {
            now.duration_since(prev)
                .is_ok_and(|elapsed| elapsed >= self.interval)
        });
        if !due {
            return;
        }
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *last = Some(now);
        }
    }

    /// Report any pending count regardless of the interval.
    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let count = self.dropped.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *self.last_warn.lock() = Some(self.clock.now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ManualClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> ManualClock {
        ManualClock::default()
    }

    fn warner(clock: &ManualClock) -> RateLimitedWarner {
        RateLimitedWarner::new(Duration::from_secs(60), SharedClock::new(clock.clone()))
    }

    #[rstest]
    fn emits_first_warning_immediately(clock: ManualClock) {
        let warner = warner(&clock);
        let mut warnings = Vec::new();
        warner.record_drops(3);
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![3]);
        assert_eq!(warner.pending(), 0);
    }

    #[rstest]
    fn holds_counts_until_interval_elapses(clock: ManualClock) {
        let warner = warner(&clock);
        let mut warnings = Vec::new();
        warner.record_drops(1);
        warner.warn_if_due(|c| warnings.push(c));
        warner.record_drops(4);
        clock.advance(Duration::from_secs(59));
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1]);
        assert_eq!(warner.pending(), 4);

        clock.advance(Duration::from_secs(1));
        warner.record_drops(2);
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![1, 6]);
    }

    #[rstest]
    fn flush_reports_pending_and_restarts_interval(clock: ManualClock) {
        let warner = warner(&clock);
        let mut warnings = Vec::new();
        warner.record_drops(2);
        warner.flush(|c| warnings.push(c));
        warner.record_drops(1);
        warner.warn_if_due(|c| warnings.push(c));
        assert_eq!(warnings, vec![2]);
    }

    #[rstest]
    fn nothing_pending_emits_nothing(clock: ManualClock) {
        let warner = warner(&clock);
        let mut called = false;
        warner.warn_if_due(|_| called = true);
        warner.flush(|_| called = true);
        assert!(!called);
    }
}
