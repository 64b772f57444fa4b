//! Tablet/clamshell usage accounting.
//!
//! Time is bucketed on the wall clock into intervals named after the mode
//! they were spent in. An interval closes on every mode change, on suspend,
//! and on shutdown.

use serde::Serialize;
use std::time::{Duration, SystemTime};

use crate::core::types::IntervalType;

/// Cumulative usage totals at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UsageReport {
    pub active: Duration,
    pub inactive: Duration,
    /// `100 * active_secs / total_secs` in whole seconds, absent when no
    /// whole second of runtime was recorded.
    pub active_percentage: Option<u32>,
}

impl UsageReport {
    pub fn new(active: Duration, inactive: Duration) -> Self {
        let total_secs = active.as_secs() + inactive.as_secs();
        let active_percentage = if total_secs > 0 {
            Some((100 * active.as_secs() / total_secs) as u32)
        } else {
            None
        };
        Self {
            active,
            inactive,
            active_percentage,
        }
    }

    pub fn total(&self) -> Duration {
        self.active + self.inactive
    }

    pub fn active_minutes(&self) -> u64 {
        self.active.as_secs() / 60
    }

    pub fn inactive_minutes(&self) -> u64 {
        self.inactive.as_secs() / 60
    }

    pub fn total_minutes(&self) -> u64 {
        self.total().as_secs() / 60
    }
}

/// Running usage totals plus the start of the open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageTracker {
    interval_start: SystemTime,
    total_active: Duration,
    total_inactive: Duration,
}

impl UsageTracker {
    pub fn new(now: SystemTime) -> Self {
        Self {
            interval_start: now,
            total_active: Duration::ZERO,
            total_inactive: Duration::ZERO,
        }
    }

    pub fn interval_start(&self) -> SystemTime {
        self.interval_start
    }

    /// Close the open interval as `kind` and start a new one at `now`.
    ///
    /// Returns the closed interval's length. A wall clock that stepped
    /// backwards yields a zero-length interval.
    pub fn record(&mut self, kind: IntervalType, now: SystemTime) -> Duration {
        let elapsed = now
            .duration_since(self.interval_start)
            .unwrap_or(Duration::ZERO);
        match kind {
            IntervalType::Active => self.total_active += elapsed,
            IntervalType::Inactive => self.total_inactive += elapsed,
        }
        self.interval_start = now;
        elapsed
    }

    /// Discard the open interval and start counting again at `now`.
    pub fn restart(&mut self, now: SystemTime) {
        self.interval_start = now;
    }

    pub fn total(&self, kind: IntervalType) -> Duration {
        match kind {
            IntervalType::Active => self.total_active,
            IntervalType::Inactive => self.total_inactive,
        }
    }

    pub fn report(&self) -> UsageReport {
        UsageReport::new(self.total_active, self.total_inactive)
    }
}
