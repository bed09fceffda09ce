//! Time source used by the request rate limiter.
//!
//! Throttling blocks the calling thread, so the limiter reads and sleeps
//! through this trait. Tests substitute a manual clock that advances
//! instantly.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

/// Wall-clock reads and blocking sleeps.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Clock backed by [`SystemTime::now`] and [`thread::sleep`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Cloneable handle to a clock trait object.
#[derive(Clone)]
pub struct SharedClock(Arc<dyn Clock>);

impl SharedClock {
    pub fn new<C: Clock + 'static>(clock: C) -> Self {
        Self(Arc::new(clock))
    }

    pub fn now(&self) -> SystemTime {
        self.0.now()
    }

    pub fn sleep(&self, duration: Duration) {
        self.0.sleep(duration);
    }
}

impl Default for SharedClock {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl fmt::Debug for SharedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedClock(<dyn Clock>)")
    }
}
