//! Device environment queried by the controller.
//!
//! The controller never owns display state. It asks whether an internal
//! panel exists and is lit; with no such panel (docked, lid closed on an
//! external monitor) tablet mode is suppressed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait DeviceEnvironment: Send {
    fn has_internal_display(&self) -> bool;

    fn is_internal_display_active(&self) -> bool;

    /// No usable internal panel.
    fn is_docked(&self) -> bool {
        !self.has_internal_display() || !self.is_internal_display_active()
    }
}

/// Settable display state. Clones share the flags.
///
/// Starts with an active internal display.
#[derive(Debug, Clone)]
pub struct SharedDisplayState {
    internal_present: Arc<AtomicBool>,
    internal_active: Arc<AtomicBool>,
}

impl SharedDisplayState {
    pub fn new(internal_present: bool, internal_active: bool) -> Self {
        Self {
            internal_present: Arc::new(AtomicBool::new(internal_present)),
            internal_active: Arc::new(AtomicBool::new(internal_active)),
        }
    }

    pub fn set(&self, internal_present: bool, internal_active: bool) {
        self.internal_present.store(internal_present, Ordering::SeqCst);
        self.internal_active.store(internal_active, Ordering::SeqCst);
    }

    pub fn set_internal_active(&self, active: bool) {
        self.internal_active.store(active, Ordering::SeqCst);
    }
}

impl Default for SharedDisplayState {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl DeviceEnvironment for SharedDisplayState {
    fn has_internal_display(&self) -> bool {
        self.internal_present.load(Ordering::SeqCst)
    }

    fn is_internal_display_active(&self) -> bool {
        self.internal_active.load(Ordering::SeqCst)
    }
}
