//! Test utilities for controller scenarios.
//!
//! Builds a controller on a manual clock with shared display state and an
//! in-memory metrics sink, and records observer notifications.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use sandhi::{
    AccelerometerUpdate, Clock, ControllerConfig, InMemoryMetrics, LidState, ManualClock,
    SharedDisplayState, TabletModeController, TabletModeObserver, TabletSwitch, Vector3,
};

/// Gravity used by hand-written vectors.
pub const G: f32 = 9.8;

/// Observer that logs notifications by name.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<&'static str>>,
}

impl Recorder {
    /// Drain the recorded notifications.
    pub fn take(&self) -> Vec<&'static str> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl TabletModeObserver for Recorder {
    fn on_tablet_mode_starting(&self) {
        self.events.lock().push("starting");
    }
    fn on_tablet_mode_started(&self) {
        self.events.lock().push("started");
    }
    fn on_tablet_mode_ending(&self) {
        self.events.lock().push("ending");
    }
    fn on_tablet_mode_ended(&self) {
        self.events.lock().push("ended");
    }
    fn on_tablet_mode_events_blocking_changed(&self) {
        self.events.lock().push("blocking");
    }
}

/// A controller wired to test doubles.
pub struct Rig {
    pub controller: TabletModeController,
    pub clock: ManualClock,
    pub display: SharedDisplayState,
    pub metrics: InMemoryMetrics,
    pub recorder: Arc<Recorder>,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        let clock = ManualClock::new();
        clock.advance(Duration::from_secs(1));
        let display = SharedDisplayState::default();
        let metrics = InMemoryMetrics::new();
        let controller = TabletModeController::new(
            config,
            Box::new(display.clone()),
            Box::new(metrics.clone()),
            Box::new(clock.clone()),
        );
        let recorder = Arc::new(Recorder::default());
        controller.add_observer(recorder.clone());
        Self {
            controller,
            clock,
            display,
            metrics,
            recorder,
        }
    }

    /// Device lying flat with the lid opened to `degrees`.
    pub fn open_lid_to_angle(&mut self, degrees: f32) {
        self.controller
            .on_accelerometer_update(&AccelerometerUpdate::for_lid_angle(degrees));
    }

    /// Hinge pointing at the ground; readings are unreliable.
    pub fn hold_device_vertical(&mut self) {
        self.controller
            .on_accelerometer_update(&AccelerometerUpdate::vertical_hinge());
    }

    pub fn update(&mut self, base: Vector3, lid: Vector3) {
        self.controller
            .on_accelerometer_update(&AccelerometerUpdate::new(base, lid));
    }

    pub fn set_tablet_switch(&mut self, on: bool) {
        let now = self.clock.now_ticks();
        self.controller
            .tablet_mode_event_received(TabletSwitch::from(on), now);
    }

    pub fn set_lid(&mut self, state: LidState) {
        let now = self.clock.now_ticks();
        self.controller.lid_event_received(state, now);
    }

    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
    }

    pub fn in_tablet(&self) -> bool {
        self.controller.is_tablet_mode_enabled()
    }
}
