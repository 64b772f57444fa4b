//! Sensor and mode types shared by every layer.
//!
//! - [`AccelerometerUpdate`]: one delivery from the sensor driver, carrying
//!   the base (keyboard) and/or lid (screen) reading
//! - [`TabletModeState`]: the binary UI mode decision
//! - [`UiMode`]: forced mode read once at startup
//! - [`LidState`], [`TabletSwitch`], [`SwitchStates`]: power-manager signals

use serde::{Deserialize, Serialize};

use super::math::Vector3;

/// Standard gravity in m/s².
pub const MEAN_GRAVITY: f32 = 9.80665;

/// Which half of the device a reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerometerSource {
    /// Keyboard half.
    Base,
    /// Screen half.
    Lid,
}

/// One accelerometer reading with the driver's convergence flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerometerReading {
    /// Acceleration in m/s².
    pub vector: Vector3,
    /// Driver heuristic: the reading has converged and can be trusted.
    pub stable: bool,
}

impl AccelerometerReading {
    pub fn new(vector: Vector3, stable: bool) -> Self {
        Self { vector, stable }
    }

    pub fn stable(vector: Vector3) -> Self {
        Self::new(vector, true)
    }
}

/// A delivery from the accelerometer driver.
///
/// Either source may be missing: a clamshell laptop or a slate tablet only
/// reports the lid sensor, in which case no hinge angle can be derived.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccelerometerUpdate {
    pub base: Option<AccelerometerReading>,
    pub lid: Option<AccelerometerReading>,
}

impl AccelerometerUpdate {
    /// Paired update with both readings marked stable.
    pub fn new(base: Vector3, lid: Vector3) -> Self {
        Self {
            base: Some(AccelerometerReading::stable(base)),
            lid: Some(AccelerometerReading::stable(lid)),
        }
    }

    /// Paired update with explicit per-source stability.
    pub fn with_stability(base: Vector3, base_stable: bool, lid: Vector3, lid_stable: bool) -> Self {
        Self {
            base: Some(AccelerometerReading::new(base, base_stable)),
            lid: Some(AccelerometerReading::new(lid, lid_stable)),
        }
    }

    /// Update carrying only the lid sensor.
    pub fn lid_only(lid: Vector3) -> Self {
        Self {
            base: None,
            lid: Some(AccelerometerReading::stable(lid)),
        }
    }

    /// Synthesize the readings of a device lying flat with the lid opened
    /// to `degrees` (0 = closed, 180 = flat, 360 = folded back).
    ///
    /// ```
    /// use sandhi::core::types::AccelerometerUpdate;
    ///
    /// let update = AccelerometerUpdate::for_lid_angle(270.0);
    /// assert!(update.has_both());
    /// ```
    pub fn for_lid_angle(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::new(
            Vector3::new(0.0, -MEAN_GRAVITY, 0.0),
            Vector3::new(0.0, MEAN_GRAVITY * cos, MEAN_GRAVITY * sin),
        )
    }

    /// Readings of a device held with the hinge pointing straight down.
    pub fn vertical_hinge() -> Self {
        Self::new(Vector3::new(9.8, -1.0, 0.0), Vector3::new(9.8, -1.0, 0.0))
    }

    pub fn has(&self, source: AccelerometerSource) -> bool {
        self.get(source).is_some()
    }

    pub fn has_both(&self) -> bool {
        self.base.is_some() && self.lid.is_some()
    }

    pub fn get(&self, source: AccelerometerSource) -> Option<&AccelerometerReading> {
        match source {
            AccelerometerSource::Base => self.base.as_ref(),
            AccelerometerSource::Lid => self.lid.as_ref(),
        }
    }

    /// Driver stability flag for `source`; false when the source is missing.
    pub fn is_reading_stable(&self, source: AccelerometerSource) -> bool {
        self.get(source).map(|r| r.stable).unwrap_or(false)
    }

    /// Absolute difference of the two reading magnitudes, if both exist.
    pub fn magnitude_deviation(&self) -> Option<f32> {
        match (&self.base, &self.lid) {
            (Some(base), Some(lid)) => Some((base.vector.length() - lid.vector.length()).abs()),
            _ => None,
        }
    }

    /// Both halves sit on one rigid body, so their magnitudes should agree
    /// to within `max_deviation`.
    pub fn magnitudes_consistent(&self, max_deviation: f32) -> bool {
        self.magnitude_deviation()
            .map(|d| d <= max_deviation)
            .unwrap_or(false)
    }
}

/// Binary UI mode decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabletModeState {
    /// Tablet mode.
    Active,
    /// Clamshell (laptop) mode.
    #[default]
    Inactive,
}

impl TabletModeState {
    pub fn is_active(&self) -> bool {
        matches!(self, TabletModeState::Active)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TabletModeState::Active => "tablet",
            TabletModeState::Inactive => "clamshell",
        }
    }
}

/// Usage interval kind, named after the state the interval was spent in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalType {
    Inactive,
    Active,
}

impl From<TabletModeState> for IntervalType {
    fn from(state: TabletModeState) -> Self {
        match state {
            TabletModeState::Active => IntervalType::Active,
            TabletModeState::Inactive => IntervalType::Inactive,
        }
    }
}

/// Forced UI mode, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    /// Decide from sensors and switches.
    #[default]
    Auto,
    /// Always clamshell.
    Clamshell,
    /// Always tablet.
    Tablet,
}

/// Lid switch reported by the power manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LidState {
    Open,
    Closed,
}

/// Hardware tablet-mode switch reported by the power manager.
///
/// The switch trips at roughly 300°, so `On` is always trustworthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabletSwitch {
    On,
    Off,
}

impl From<bool> for TabletSwitch {
    fn from(on: bool) -> Self {
        if on {
            TabletSwitch::On
        } else {
            TabletSwitch::Off
        }
    }
}

/// Cached switch states queried from the power manager at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStates {
    pub lid: LidState,
    pub tablet_mode: TabletSwitch,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lid_only_cannot_pair() {
        let update = AccelerometerUpdate::lid_only(Vector3::new(0.0, 0.0, MEAN_GRAVITY));
        assert!(!update.has(AccelerometerSource::Base));
        assert!(update.has(AccelerometerSource::Lid));
        assert!(!update.has_both());
        assert!(update.magnitude_deviation().is_none());
        assert!(!update.magnitudes_consistent(1.0));
        assert!(!update.is_reading_stable(AccelerometerSource::Base));
    }

    #[test]
    fn test_magnitudes_consistent() {
        let update = AccelerometerUpdate::new(
            Vector3::new(0.0, 0.0, -9.8),
            Vector3::new(0.0, 0.0, -9.3),
        );
        assert_relative_eq!(update.magnitude_deviation().unwrap(), 0.5, epsilon = 1e-5);
        assert!(update.magnitudes_consistent(1.0));

        let noisy = AccelerometerUpdate::new(
            Vector3::new(0.0, 0.0, -9.8),
            Vector3::new(0.0, 0.0, -12.0),
        );
        assert!(!noisy.magnitudes_consistent(1.0));
    }

    #[test]
    fn test_for_lid_angle_magnitudes_match() {
        for degrees in [0.0f32, 45.0, 180.0, 270.0, 355.0] {
            let update = AccelerometerUpdate::for_lid_angle(degrees);
            assert!(update.magnitude_deviation().unwrap() < 1e-3);
        }
    }

    #[test]
    fn test_stability_flags() {
        let update = AccelerometerUpdate::with_stability(
            Vector3::new(0.0, 0.0, -9.8),
            true,
            Vector3::new(0.0, 0.0, -9.8),
            false,
        );
        assert!(update.is_reading_stable(AccelerometerSource::Base));
        assert!(!update.is_reading_stable(AccelerometerSource::Lid));
    }

    #[test]
    fn test_ui_mode_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            mode: UiMode,
        }
        let w: Wrapper = toml::from_str("mode = \"tablet\"").unwrap();
        assert_eq!(w.mode, UiMode::Tablet);
        let w: Wrapper = toml::from_str("mode = \"auto\"").unwrap();
        assert_eq!(w.mode, UiMode::Auto);
    }

    #[test]
    fn test_interval_type_from_state() {
        assert_eq!(IntervalType::from(TabletModeState::Active), IntervalType::Active);
        assert_eq!(IntervalType::from(TabletModeState::Inactive), IntervalType::Inactive);
    }
}
