//! Time sources.
//!
//! Debounce windows are measured on the monotonic clock so they are immune
//! to wall-clock adjustment. Usage intervals are bucketed on wall-clock time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// Source of monotonic ticks and wall-clock time.
pub trait Clock: Send + Sync {
    /// Monotonic time, used for debounce windows and timers.
    fn now_ticks(&self) -> Instant;

    /// Wall-clock time, used for usage accounting.
    fn now_wall(&self) -> SystemTime;
}

/// The real system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ticks(&self) -> Instant {
        Instant::now()
    }

    fn now_wall(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually advanced clock for tests and trace replay.
///
/// Clones share the same elapsed time, so a test can hold one handle while
/// the controller owns another. Both clocks advance together.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin_ticks: Instant,
    origin_wall: SystemTime,
    elapsed: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin_ticks: Instant::now(),
            origin_wall: SystemTime::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, delta: Duration) {
        *self.elapsed.lock() += delta;
    }

    /// Move to `elapsed` since the origin. Never moves backwards.
    pub fn set_elapsed(&self, elapsed: Duration) {
        let mut current = self.elapsed.lock();
        if elapsed > *current {
            *current = elapsed;
        }
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ticks(&self) -> Instant {
        self.origin_ticks + self.elapsed()
    }

    fn now_wall(&self) -> SystemTime {
        self.origin_wall + self.elapsed()
    }
}
