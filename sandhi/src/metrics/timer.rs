//! Polled repeating timer.
//!
//! There is no event loop: the host calls [`RepeatingTimer::poll`] with the
//! current monotonic time and runs the task whenever it returns true.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatingTimer {
    interval: Duration,
    running: bool,
    /// None while running means the deadline lies beyond `Instant`'s range.
    next_fire: Option<Instant>,
}

impl RepeatingTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            next_fire: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn next_fire(&self) -> Option<Instant> {
        self.next_fire
    }

    /// Start the timer if it is not already running.
    ///
    /// Returns true when this call started it.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.schedule(now);
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.next_fire = None;
    }

    /// True when the timer is due. Reschedules one interval after `now`, so
    /// a long gap between polls fires once rather than catching up.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_fire {
            Some(due) if now >= due => {
                self.schedule(now);
                true
            }
            _ => false,
        }
    }

    /// Fire immediately if running, restarting the interval from `now`.
    pub fn fire_now(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        self.schedule(now);
        true
    }

    fn schedule(&mut self, now: Instant) {
        self.next_fire = now.checked_add(self.interval);
    }
}
