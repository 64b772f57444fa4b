//! Tablet mode controller.
//!
//! Fuses base and lid accelerometer readings into a hinge angle and decides
//! when the UI switches between clamshell and tablet mode.
//!
//! # State Machine
//!
//! ```text
//!                 stable angle >= 200°, lid open
//!                 unstable angle >= 200° for 2 s
//!                 tablet switch on
//!  ┌───────────┐ ─────────────────────────────────▶ ┌──────────┐
//!  │ Clamshell │                                     │  Tablet  │
//!  │ (Inactive)│ ◀───────────────────────────────── │ (Active) │
//!  └───────────┘  stable angle <= 160°               └──────────┘
//!                 lid closed (switch off)
//!                 external mouse attached
//!                 docked
//! ```
//!
//! Angles between 160° and 200° form a dead band: no transition either way.
//!
//! # Input priority
//!
//! 1. Forced UI mode: fixes the mode for the process lifetime.
//! 2. Docked (no active internal display): angle-driven transitions off.
//! 3. Hardware tablet switch: while on, the angle is not evaluated.
//! 4. Hinge angle with hysteresis and debounce.
//!
//! # Example
//!
//! ```
//! use sandhi::core::clock::ManualClock;
//! use sandhi::core::types::AccelerometerUpdate;
//! use sandhi::engine::{ControllerConfig, SharedDisplayState, TabletModeController};
//! use sandhi::metrics::NullMetrics;
//!
//! let mut controller = TabletModeController::new(
//!     ControllerConfig::default(),
//!     Box::new(SharedDisplayState::default()),
//!     Box::new(NullMetrics),
//!     Box::new(ManualClock::new()),
//! );
//!
//! controller.on_accelerometer_update(&AccelerometerUpdate::for_lid_angle(300.0));
//! assert!(controller.is_tablet_mode_enabled());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::clock::Clock;
use crate::core::math::Vector3;
use crate::core::types::{
    AccelerometerUpdate, IntervalType, LidState, SwitchStates, TabletModeState, TabletSwitch,
    UiMode,
};
use crate::metrics::{
    MetricsSink, RepeatingTimer, UsageReport, UsageTracker, ACTION_TOUCHVIEW_DISABLED,
    ACTION_TOUCHVIEW_ENABLED, ACTION_TOUCHVIEW_INITIALLY_DISABLED,
};
use crate::sensors::{HingeAngleEstimator, HingeEstimatorConfig, StabilityWindow};

use super::environment::DeviceEnvironment;
use super::observer::{ObserverList, TabletModeObserver};

/// Configuration for [`TabletModeController`].
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Lid angle at or above which tablet mode is entered (degrees).
    /// Default: 200
    pub enter_angle: f32,

    /// Stable lid angle at or below which tablet mode is left (degrees).
    /// Default: 160
    pub exit_angle: f32,

    /// How long an unstable angle must persist before it may enter tablet
    /// mode.
    /// Default: 2 seconds
    pub unstable_lid_angle_duration: Duration,

    /// Period of the lid angle telemetry sample.
    /// Default: 1 hour
    pub record_lid_angle_interval: Duration,

    /// Forced UI mode.
    /// Default: Auto
    pub ui_mode: UiMode,

    /// Whether the device can be a tablet at all (convertible or slate with
    /// an accelerometer).
    /// Default: true
    pub tablet_mode_capable: bool,

    /// Smoothing and stability thresholds.
    pub estimator: HingeEstimatorConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            enter_angle: 200.0,
            exit_angle: 160.0,
            unstable_lid_angle_duration: Duration::from_secs(2),
            record_lid_angle_interval: Duration::from_secs(3600),
            ui_mode: UiMode::Auto,
            tablet_mode_capable: true,
            estimator: HingeEstimatorConfig::default(),
        }
    }
}

/// Clamshell/tablet decision engine.
pub struct TabletModeController {
    config: ControllerConfig,

    estimator: HingeAngleEstimator,

    /// Start of the current run of unstable angles.
    stability: StabilityWindow,

    state: TabletModeState,

    /// Last computed hinge angle, `None` until one could be computed.
    lid_angle: Option<f32>,

    /// Whether the latest update carried both base and lid readings.
    can_detect_lid_angle: bool,

    lid_is_closed: bool,

    tablet_mode_switch_is_on: bool,

    has_external_mouse: bool,

    internal_input_events_blocked: bool,

    usage: UsageTracker,

    lid_angle_timer: RepeatingTimer,

    observers: ObserverList,

    environment: Box<dyn DeviceEnvironment>,

    metrics: Box<dyn MetricsSink>,

    clock: Box<dyn Clock>,
}

impl TabletModeController {
    /// Create a controller in clamshell mode.
    ///
    /// A forced UI mode takes effect at [`Self::on_shell_initialized`].
    pub fn new(
        config: ControllerConfig,
        environment: Box<dyn DeviceEnvironment>,
        metrics: Box<dyn MetricsSink>,
        clock: Box<dyn Clock>,
    ) -> Self {
        let usage = UsageTracker::new(clock.now_wall());
        Self {
            estimator: HingeAngleEstimator::new(config.estimator),
            stability: StabilityWindow::new(),
            state: TabletModeState::Inactive,
            lid_angle: None,
            can_detect_lid_angle: false,
            lid_is_closed: false,
            tablet_mode_switch_is_on: false,
            has_external_mouse: false,
            internal_input_events_blocked: false,
            usage,
            lid_angle_timer: RepeatingTimer::new(config.record_lid_angle_interval),
            observers: ObserverList::new(),
            environment,
            metrics,
            clock,
            config,
        }
    }

    // ========================================================================
    // Sensor input
    // ========================================================================

    /// Handle one delivery from the accelerometer driver.
    pub fn on_accelerometer_update(&mut self, update: &AccelerometerUpdate) {
        if !self.accepts_input() {
            return;
        }

        self.can_detect_lid_angle = update.has_both();
        let (base, lid) = match (update.base, update.lid) {
            (Some(base), Some(lid)) => (base, lid),
            _ => {
                if self.lid_angle_timer.is_running() {
                    log::debug!("[TabletMode] Lid angle undetectable, stopping record timer");
                    self.lid_angle_timer.stop();
                }
                return;
            }
        };

        if self.environment.is_docked() {
            return;
        }

        if !base.stable || !lid.stable {
            log::trace!("[TabletMode] Reading not yet stable, ignored");
            return;
        }
        if !base.vector.is_finite() || !lid.vector.is_finite() {
            log::debug!("[TabletMode] Non-finite reading, ignored");
            return;
        }
        if !update.magnitudes_consistent(self.config.estimator.noisy_magnitude_deviation) {
            log::debug!(
                "[TabletMode] Noisy reading (magnitude deviation {:.2}), ignored",
                update.magnitude_deviation().unwrap_or(f32::NAN)
            );
            return;
        }

        self.handle_hinge_rotation(base.vector, lid.vector);
    }

    fn handle_hinge_rotation(&mut self, base: Vector3, lid: Vector3) {
        let step = self.estimator.smooth(base, lid);

        // The switch trips near 300° and is authoritative while on
        if self.tablet_mode_switch_is_on {
            return;
        }

        let now = self.clock.now_ticks();
        let angle = self.estimator.lid_angle();
        if angle.is_some() {
            self.lid_angle = angle;
        }

        let is_stable = self.estimator.is_angle_stable(angle, step.is_reliable);
        self.stability.observe(is_stable, now);

        match angle {
            Some(angle) => {
                log::trace!(
                    "[TabletMode] Lid angle {:.1}° (stable={}, smoothing={:.2})",
                    angle,
                    is_stable,
                    step.smoothing_ratio
                );
                if is_stable && angle <= self.config.exit_angle {
                    self.attempt_leave_tablet_mode();
                } else if !self.lid_is_closed
                    && angle >= self.config.enter_angle
                    && (is_stable || self.unstable_run_elapsed(now))
                {
                    self.attempt_enter_tablet_mode();
                }
            }
            None => {
                log::debug!("[TabletMode] Degenerate hinge vectors, keeping previous angle");
            }
        }

        if self.lid_angle_timer.start(now) {
            log::debug!(
                "[TabletMode] Recording lid angle every {}s",
                self.config.record_lid_angle_interval.as_secs()
            );
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn attempt_enter_tablet_mode(&mut self) {
        if self.state.is_active() || self.has_external_mouse {
            self.update_internal_input_events_blocker();
            return;
        }
        self.request_mode_transition(TabletModeState::Active);
    }

    fn attempt_leave_tablet_mode(&mut self) {
        if !self.state.is_active() {
            self.update_internal_input_events_blocker();
            return;
        }
        self.request_mode_transition(TabletModeState::Inactive);
    }

    /// Switch to `target`, notifying observers and closing the usage
    /// interval. A no-op when already in `target`.
    pub fn request_mode_transition(&mut self, target: TabletModeState) {
        if self.state == target {
            return;
        }

        match target {
            TabletModeState::Active => {
                self.observers.notify(|o| o.on_tablet_mode_starting());
                self.state = TabletModeState::Active;
                self.metrics.record_action(ACTION_TOUCHVIEW_ENABLED);
                self.record_usage_interval(IntervalType::Inactive);
                log::info!("[TabletMode] Entered tablet mode");
                self.observers.notify(|o| o.on_tablet_mode_started());
            }
            TabletModeState::Inactive => {
                self.observers.notify(|o| o.on_tablet_mode_ending());
                self.state = TabletModeState::Inactive;
                self.metrics.record_action(ACTION_TOUCHVIEW_DISABLED);
                self.record_usage_interval(IntervalType::Active);
                log::info!("[TabletMode] Left tablet mode");
                self.observers.notify(|o| o.on_tablet_mode_ended());
            }
        }

        self.update_internal_input_events_blocker();
    }

    fn update_internal_input_events_blocker(&mut self) {
        let should_block = self.state.is_active() || self.lid_angle_is_in_tablet_mode_range();
        if should_block == self.internal_input_events_blocked {
            return;
        }

        self.internal_input_events_blocked = should_block;
        log::debug!(
            "[TabletMode] Internal keyboard and touchpad {}",
            if should_block { "blocked" } else { "unblocked" }
        );
        self.observers
            .notify(|o| o.on_tablet_mode_events_blocking_changed());
    }

    fn lid_angle_is_in_tablet_mode_range(&self) -> bool {
        self.can_detect_lid_angle
            && !self.lid_is_closed
            && self
                .lid_angle
                .map(|angle| angle >= self.config.enter_angle)
                .unwrap_or(false)
    }

    fn unstable_run_elapsed(&self, now: Instant) -> bool {
        self.stability
            .has_elapsed(now, self.config.unstable_lid_angle_duration)
    }

    /// Sensor and switch inputs are only honored in auto mode on capable
    /// devices.
    fn accepts_input(&self) -> bool {
        self.allow_ui_mode_change() && self.config.tablet_mode_capable
    }

    // ========================================================================
    // External signals
    // ========================================================================

    /// Lid switch changed. `time` is when the power manager saw it.
    pub fn lid_event_received(&mut self, state: LidState, time: Instant) {
        if !self.accepts_input() {
            return;
        }

        log::debug!(
            "[TabletMode] Lid {:?} ({}ms ago)",
            state,
            self.clock.now_ticks().saturating_duration_since(time).as_millis()
        );
        self.lid_is_closed = state == LidState::Closed;

        if !self.tablet_mode_switch_is_on {
            self.attempt_leave_tablet_mode();
        }
    }

    /// Hardware tablet-mode switch changed. `time` is when the power manager
    /// saw it.
    pub fn tablet_mode_event_received(&mut self, switch: TabletSwitch, time: Instant) {
        if !self.accepts_input() {
            return;
        }

        log::debug!(
            "[TabletMode] Tablet switch {:?} ({}ms ago)",
            switch,
            self.clock.now_ticks().saturating_duration_since(time).as_millis()
        );
        let on = switch == TabletSwitch::On;
        self.tablet_mode_switch_is_on = on;

        if self.environment.is_docked() {
            return;
        }

        // Switch-off exits only when no angle is available; otherwise the
        // 160° exit angle applies
        if on && !self.state.is_active() {
            self.attempt_enter_tablet_mode();
        } else if !on && self.state.is_active() && !self.can_detect_lid_angle {
            self.attempt_leave_tablet_mode();
        }
    }

    /// Displays were added, removed or reconfigured.
    pub fn on_display_configuration_changed(&mut self) {
        if !self.accepts_input() {
            return;
        }

        if self.environment.is_docked() {
            self.attempt_leave_tablet_mode();
        } else if self.tablet_mode_switch_is_on && !self.state.is_active() {
            self.attempt_enter_tablet_mode();
        }
    }

    /// An external mouse (USB or connected Bluetooth) was attached or
    /// removed.
    pub fn set_external_mouse_present(&mut self, present: bool) {
        if !self.accepts_input() || self.has_external_mouse == present {
            return;
        }

        self.has_external_mouse = present;
        log::debug!(
            "[TabletMode] External mouse {}",
            if present { "attached" } else { "removed" }
        );

        if present {
            self.attempt_leave_tablet_mode();
        } else if !self.can_detect_lid_angle {
            // Slate devices have no angle and go straight back to tablet
            self.attempt_enter_tablet_mode();
        } else if !self.environment.is_docked() && self.lid_angle_is_in_tablet_mode_range() {
            self.attempt_enter_tablet_mode();
        }
    }

    /// Shell startup. Applies a forced UI mode, or replays the cached switch
    /// states on a tablet-capable device.
    pub fn on_shell_initialized(&mut self, switch_states: Option<SwitchStates>) {
        if !self.allow_ui_mode_change() {
            log::info!("[TabletMode] UI mode forced to {:?}", self.config.ui_mode);
            let target = if self.config.ui_mode == UiMode::Tablet {
                TabletModeState::Active
            } else {
                TabletModeState::Inactive
            };
            self.request_mode_transition(target);
            return;
        }

        if !self.config.tablet_mode_capable {
            log::info!("[TabletMode] Device is not tablet capable, staying in clamshell");
            return;
        }

        self.metrics.record_action(ACTION_TOUCHVIEW_INITIALLY_DISABLED);

        if let Some(states) = switch_states {
            let now = self.clock.now_ticks();
            self.lid_event_received(states.lid, now);
            self.tablet_mode_event_received(states.tablet_mode, now);
        }
    }

    /// The system is about to sleep.
    pub fn suspend_imminent(&mut self) {
        self.record_usage_interval(self.state.into());
    }

    /// The system woke up. Time asleep is not counted as usage.
    pub fn suspend_done(&mut self, sleep_duration: Duration) {
        log::debug!("[TabletMode] Resumed after {}s", sleep_duration.as_secs());
        self.usage.restart(self.clock.now_wall());
    }

    /// Shutdown. Closes the open usage interval and reports totals.
    pub fn on_terminating(&mut self) -> UsageReport {
        self.record_usage_interval(self.state.into());
        let report = self.usage.report();
        if self.config.tablet_mode_capable {
            self.metrics.record_usage_totals(&report);
        }
        report
    }

    fn record_usage_interval(&mut self, kind: IntervalType) {
        if !self.config.tablet_mode_capable {
            return;
        }
        let elapsed = self.usage.record(kind, self.clock.now_wall());
        self.metrics.record_usage_interval(kind, elapsed);
    }

    // ========================================================================
    // Timers
    // ========================================================================

    /// Run the lid angle telemetry sample if it is due.
    ///
    /// Returns true when a sample was taken.
    pub fn poll_timers(&mut self) -> bool {
        let now = self.clock.now_ticks();
        if self.lid_angle_timer.poll(now) {
            self.record_lid_angle();
            return true;
        }
        false
    }

    /// Take the lid angle telemetry sample now, if the timer is running.
    pub fn fire_lid_angle_timer(&mut self) -> bool {
        let now = self.clock.now_ticks();
        if !self.lid_angle_timer.fire_now(now) {
            return false;
        }
        self.record_lid_angle();
        true
    }

    fn record_lid_angle(&mut self) {
        if let Some(angle) = self.lid_angle {
            self.metrics.record_lid_angle(angle.round() as u32);
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_tablet_mode_enabled(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> TabletModeState {
        self.state
    }

    /// Last computed hinge angle in degrees.
    pub fn lid_angle(&self) -> Option<f32> {
        self.lid_angle
    }

    pub fn can_detect_lid_angle(&self) -> bool {
        self.can_detect_lid_angle
    }

    pub fn are_internal_input_events_blocked(&self) -> bool {
        self.internal_input_events_blocked
    }

    /// True once the current unstable run has lasted long enough to act on.
    pub fn can_use_unstable_lid_angle(&self) -> bool {
        self.unstable_run_elapsed(self.clock.now_ticks())
    }

    pub fn forced_ui_mode(&self) -> UiMode {
        self.config.ui_mode
    }

    pub fn allow_ui_mode_change(&self) -> bool {
        self.config.ui_mode == UiMode::Auto
    }

    pub fn has_external_mouse(&self) -> bool {
        self.has_external_mouse
    }

    pub fn is_lid_closed(&self) -> bool {
        self.lid_is_closed
    }

    pub fn is_tablet_mode_switch_on(&self) -> bool {
        self.tablet_mode_switch_is_on
    }

    pub fn is_lid_angle_timer_running(&self) -> bool {
        self.lid_angle_timer.is_running()
    }

    pub fn estimator(&self) -> &HingeAngleEstimator {
        &self.estimator
    }

    pub fn stability_window(&self) -> &StabilityWindow {
        &self.stability
    }

    /// Usage totals so far, excluding the open interval.
    pub fn usage_report(&self) -> UsageReport {
        self.usage.report()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    // ========================================================================
    // Observers
    // ========================================================================

    /// Shared registry handle. Observers may register or unregister through
    /// it from inside a callback.
    pub fn observers(&self) -> &ObserverList {
        &self.observers
    }

    pub fn add_observer(&self, observer: Arc<dyn TabletModeObserver>) -> bool {
        self.observers.add(observer)
    }

    pub fn remove_observer(&self, observer: &Arc<dyn TabletModeObserver>) -> bool {
        self.observers.remove(observer)
    }
}

impl std::fmt::Debug for TabletModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabletModeController")
            .field("state", &self.state)
            .field("lid_angle", &self.lid_angle)
            .field("can_detect_lid_angle", &self.can_detect_lid_angle)
            .field("lid_is_closed", &self.lid_is_closed)
            .field("tablet_mode_switch_is_on", &self.tablet_mode_switch_is_on)
            .field("has_external_mouse", &self.has_external_mouse)
            .field("ui_mode", &self.config.ui_mode)
            .finish()
    }
}
