//! Coarse per-second request budget for remote submissions.
//!
//! The budget is tracked in whole-second buckets of the limiter's clock. Two
//! calls in different buckets always start a fresh window, even when less
//! than a second separates them.
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;

use crate::clock::SharedClock;

/// Blocking token bucket refilled once per wall-clock second.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    remaining: u32,
    window_start: SystemTime,
    clock: SharedClock,
}

fn second_bucket(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl RateLimiter {
    /// Create a limiter allowing `limit` acquisitions per second.
    ///
    /// The first window opens at construction with the full budget.
    pub fn new(limit: u32, clock: SharedClock) -> Self {
        let window_start = clock.now();
        Self {
            limit,
            remaining: limit,
            window_start,
            clock,
        }
    }

    /// Wait until a request may be sent.
    ///
    /// Returns immediately while the current second has budget left. Once it
    /// is exhausted the calling thread sleeps for one second and the budget
    /// is refilled.
    pub fn acquire(&mut self) {
        let now = self.clock.now();
        let same_second = second_bucket(now) == second_bucket(self.window_start);

        if !same_second {
            self.remaining = self.limit;
        } else if self.remaining > 0 {
            self.remaining -= 1;
        } else {
            debug!(
                "RateLimiter: {} requests issued this second, throttling",
                self.limit
            );
            self.clock.sleep(Duration::from_secs(1));
            self.remaining = self.limit;
        }

        self.window_start = self.clock.now();
    }

    /// Acquisitions left in the current window.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Start of the current window.
    pub fn window_start(&self) -> SystemTime {
        self.window_start
    }
}
