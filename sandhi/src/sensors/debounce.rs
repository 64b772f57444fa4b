//! Debounce window for unstable hinge angles.
//!
//! Near-closed angles (and angles read with the hinge near vertical) are
//! ambiguous. An unstable angle is only acted on once the device has been
//! continuously unstable for a minimum duration; any stable reading restarts
//! the count.

use std::time::{Duration, Instant};

/// Tracks when the current unbroken run of unstable readings began.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StabilityWindow {
    first_unstable: Option<Instant>,
}

impl StabilityWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classification.
    ///
    /// A stable reading clears the window. The first unstable reading after
    /// that stamps `now`; later unstable readings keep the first stamp.
    pub fn observe(&mut self, stable: bool, now: Instant) {
        if stable {
            self.first_unstable = None;
        } else if self.first_unstable.is_none() {
            self.first_unstable = Some(now);
        }
    }

    pub fn first_unstable(&self) -> Option<Instant> {
        self.first_unstable
    }

    pub fn is_open(&self) -> bool {
        self.first_unstable.is_some()
    }

    /// How long the current unstable run has lasted, or `None` if stable.
    pub fn unstable_for(&self, now: Instant) -> Option<Duration> {
        self.first_unstable
            .map(|start| now.saturating_duration_since(start))
    }

    /// True once the unstable run has lasted at least `duration`.
    pub fn has_elapsed(&self, now: Instant, duration: Duration) -> bool {
        self.unstable_for(now)
            .map(|elapsed| elapsed >= duration)
            .unwrap_or(false)
    }
}
