//! Trace replay.
//!
//! Drives a [`TabletModeController`] from recorded events on a
//! [`ManualClock`], so debounce windows and usage intervals follow the
//! trace's timestamps rather than wall time.
//!
//! # Example
//!
//! ```
//! use sandhi::core::types::AccelerometerUpdate;
//! use sandhi::engine::ControllerConfig;
//! use sandhi::io::{Replayer, TraceEvent};
//!
//! let mut replayer = Replayer::new(ControllerConfig::default());
//! replayer.start(None);
//! replayer.run(vec![
//!     TraceEvent::accelerometer(0, &AccelerometerUpdate::for_lid_angle(90.0)),
//!     TraceEvent::accelerometer(500, &AccelerometerUpdate::for_lid_angle(300.0)),
//! ]);
//!
//! let summary = replayer.finish();
//! assert_eq!(summary.transitions.len(), 1);
//! assert_eq!(summary.transitions[0].t_ms, 500);
//! ```

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::trace::TraceEvent;
use crate::core::clock::{Clock, ManualClock};
use crate::core::types::{SwitchStates, TabletModeState};
use crate::engine::{ControllerConfig, SharedDisplayState, TabletModeController, TabletModeObserver};
use crate::metrics::{InMemoryMetrics, MetricsFanout, MetricsSink, UsageReport};

/// A mode change observed during replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeTransition {
    /// Trace time of the change.
    pub t_ms: u64,
    /// Mode entered.
    pub state: TabletModeState,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub events: usize,
    pub accelerometer_updates: usize,
    /// Events stamped earlier than their predecessor; applied at the
    /// current time.
    pub out_of_order_events: usize,
    pub transitions: Vec<ModeTransition>,
    pub blocking_changes: usize,
    pub final_state: TabletModeState,
    pub final_lid_angle: Option<f32>,
    pub lid_angle_samples: Vec<u32>,
    pub actions: BTreeMap<String, usize>,
    pub usage: UsageReport,
}

/// Observer that stamps transitions with the replay clock.
struct TransitionRecorder {
    clock: ManualClock,
    transitions: Mutex<Vec<ModeTransition>>,
    blocking_changes: AtomicUsize,
}

impl TransitionRecorder {
    fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            transitions: Mutex::new(Vec::new()),
            blocking_changes: AtomicUsize::new(0),
        }
    }

    fn push(&self, state: TabletModeState) {
        let t_ms = self.clock.elapsed().as_millis() as u64;
        self.transitions.lock().push(ModeTransition { t_ms, state });
    }
}

impl TabletModeObserver for TransitionRecorder {
    fn on_tablet_mode_started(&self) {
        self.push(TabletModeState::Active);
    }

    fn on_tablet_mode_ended(&self) {
        self.push(TabletModeState::Inactive);
    }

    fn on_tablet_mode_events_blocking_changed(&self) {
        self.blocking_changes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Feeds trace events into a controller.
pub struct Replayer {
    controller: TabletModeController,
    clock: ManualClock,
    display: SharedDisplayState,
    metrics: InMemoryMetrics,
    recorder: Arc<TransitionRecorder>,
    events: usize,
    accelerometer_updates: usize,
    out_of_order_events: usize,
}

impl Replayer {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_sink(config, None)
    }

    /// Replayer that also forwards telemetry to `sink`.
    pub fn with_sink(config: ControllerConfig, sink: Option<Box<dyn MetricsSink>>) -> Self {
        let clock = ManualClock::new();
        let display = SharedDisplayState::default();
        let metrics = InMemoryMetrics::new();

        let mut fanout = MetricsFanout::new().with(Box::new(metrics.clone()));
        if let Some(sink) = sink {
            fanout = fanout.with(sink);
        }

        let controller = TabletModeController::new(
            config,
            Box::new(display.clone()),
            Box::new(fanout),
            Box::new(clock.clone()),
        );
        let recorder = Arc::new(TransitionRecorder::new(clock.clone()));
        controller.add_observer(recorder.clone());

        Self {
            controller,
            clock,
            display,
            metrics,
            recorder,
            events: 0,
            accelerometer_updates: 0,
            out_of_order_events: 0,
        }
    }

    /// Shell startup, optionally with the cached switch states.
    pub fn start(&mut self, switch_states: Option<SwitchStates>) {
        self.controller.on_shell_initialized(switch_states);
    }

    /// Advance the clock to the event time, run due timers, then apply it.
    pub fn apply(&mut self, event: &TraceEvent) {
        let at = Duration::from_millis(event.t_ms());
        if at < self.clock.elapsed() {
            log::warn!(
                "[Replay] Event at {}ms precedes current time {}ms, applying now",
                event.t_ms(),
                self.clock.elapsed().as_millis()
            );
            self.out_of_order_events += 1;
        }
        self.clock.set_elapsed(at);
        self.controller.poll_timers();
        self.events += 1;

        match *event {
            TraceEvent::Accelerometer { .. } => {
                if let Some(update) = event.to_update() {
                    self.accelerometer_updates += 1;
                    self.controller.on_accelerometer_update(&update);
                }
            }
            TraceEvent::Lid { open, .. } => {
                let now = self.now_ticks();
                self.controller
                    .lid_event_received(TraceEvent::lid_state(open), now);
            }
            TraceEvent::TabletSwitch { on, .. } => {
                let now = self.now_ticks();
                self.controller
                    .tablet_mode_event_received(TraceEvent::tablet_switch(on), now);
            }
            TraceEvent::Display {
                internal_present,
                internal_active,
                ..
            } => {
                self.display.set(internal_present, internal_active);
                self.controller.on_display_configuration_changed();
            }
            TraceEvent::Mouse { present, .. } => {
                self.controller.set_external_mouse_present(present);
            }
            TraceEvent::Suspend { duration_ms, .. } => {
                let sleep = Duration::from_millis(duration_ms);
                self.controller.suspend_imminent();
                self.clock.advance(sleep);
                self.controller.suspend_done(sleep);
            }
        }
    }

    pub fn run<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = TraceEvent>,
    {
        for event in events {
            self.apply(&event);
        }
    }

    /// Shut the controller down and collect the results.
    pub fn finish(mut self) -> ReplaySummary {
        let usage = self.controller.on_terminating();
        let snapshot = self.metrics.snapshot();
        let transitions = self.recorder.transitions.lock().clone();

        ReplaySummary {
            events: self.events,
            accelerometer_updates: self.accelerometer_updates,
            out_of_order_events: self.out_of_order_events,
            transitions,
            blocking_changes: self.recorder.blocking_changes.load(Ordering::SeqCst),
            final_state: self.controller.state(),
            final_lid_angle: self.controller.lid_angle(),
            lid_angle_samples: snapshot.lid_angles.clone(),
            actions: snapshot.action_counts(),
            usage,
        }
    }

    pub fn controller(&self) -> &TabletModeController {
        &self.controller
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn metrics(&self) -> &InMemoryMetrics {
        &self.metrics
    }

    fn now_ticks(&self) -> Instant {
        self.clock.now_ticks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AccelerometerUpdate;
    use crate::metrics::ACTION_TOUCHVIEW_ENABLED;

    fn accel(t_ms: u64, degrees: f32) -> TraceEvent {
        TraceEvent::accelerometer(t_ms, &AccelerometerUpdate::for_lid_angle(degrees))
    }

    #[test]
    fn test_transitions_stamped_with_trace_time() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![accel(0, 90.0), accel(1_000, 270.0), accel(4_000, 120.0)]);

        let summary = replayer.finish();
        assert_eq!(
            summary.transitions,
            vec![
                ModeTransition {
                    t_ms: 1_000,
                    state: TabletModeState::Active
                },
                ModeTransition {
                    t_ms: 4_000,
                    state: TabletModeState::Inactive
                },
            ]
        );
        assert_eq!(summary.final_state, TabletModeState::Inactive);
        assert_eq!(summary.accelerometer_updates, 3);
        assert_eq!(summary.actions.get(ACTION_TOUCHVIEW_ENABLED), Some(&1));
        assert_eq!(summary.usage.active, Duration::from_secs(3));
        assert_eq!(summary.usage.inactive, Duration::from_secs(1));
    }

    #[test]
    fn test_debounce_follows_trace_time() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![accel(0, 355.0), accel(1_000, 355.0), accel(1_999, 355.0)]);
        assert!(!replayer.controller().is_tablet_mode_enabled());

        replayer.apply(&accel(2_000, 355.0));
        assert!(replayer.controller().is_tablet_mode_enabled());
    }

    #[test]
    fn test_out_of_order_event_counted() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![accel(500, 90.0), accel(100, 90.0)]);

        assert_eq!(replayer.clock().elapsed(), Duration::from_millis(500));
        let summary = replayer.finish();
        assert_eq!(summary.out_of_order_events, 1);
        assert_eq!(summary.events, 2);
    }

    #[test]
    fn test_suspend_excluded_from_usage() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![
            accel(0, 300.0),
            TraceEvent::Suspend {
                t_ms: 60_000,
                duration_ms: 600_000,
            },
            accel(720_000, 300.0),
        ]);

        let summary = replayer.finish();
        assert_eq!(summary.usage.active, Duration::from_secs(120));
        assert_eq!(summary.usage.inactive, Duration::ZERO);
    }

    #[test]
    fn test_lid_angle_sampled_hourly() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![
            accel(0, 90.0),
            accel(3_600_000, 120.0),
            accel(7_200_000, 120.0),
        ]);

        let summary = replayer.finish();
        // Polled before each event is applied
        assert_eq!(summary.lid_angle_samples, vec![90, 120]);
    }

    #[test]
    fn test_mouse_removed_while_docked_stays_clamshell() {
        let mut replayer = Replayer::new(ControllerConfig::default());
        replayer.run(vec![
            accel(0, 300.0),
            TraceEvent::Mouse {
                t_ms: 10,
                present: true,
            },
        ]);
        assert!(!replayer.controller().is_tablet_mode_enabled());

        replayer.run(vec![
            TraceEvent::Display {
                t_ms: 20,
                internal_present: true,
                internal_active: false,
            },
            TraceEvent::Mouse {
                t_ms: 30,
                present: false,
            },
        ]);
        assert!(!replayer.controller().is_tablet_mode_enabled());

        replayer.run(vec![
            TraceEvent::Display {
                t_ms: 40,
                internal_present: true,
                internal_active: true,
            },
            accel(50, 300.0),
        ]);
        assert!(replayer.controller().is_tablet_mode_enabled());
    }
}
