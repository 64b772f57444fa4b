//! Hinge angle estimation from paired base and lid accelerometers.
//!
//! Both halves of a convertible measure gravity. Projecting each reading onto
//! the plane orthogonal to the hinge and measuring the rotation between the
//! two projections yields the hinge angle.
//!
//! # Why smoothing?
//!
//! | Hinge orientation | Parallel acceleration | Angle quality |
//! |-------------------|----------------------|---------------|
//! | Horizontal        | ~0 m/s²              | Good          |
//! | Tilted            | 7.0 - 8.7 m/s²       | Noisy         |
//! | Near vertical     | > 8.7 m/s²           | Unusable      |
//!
//! As the hinge approaches vertical, gravity points along the hinge and both
//! sensors read nearly the same vector. Small perpendicular jolts then swing
//! the computed angle wildly, so old state is retained in proportion to how
//! vertical the hinge is:
//!
//! ```text
//! ratio    = clamp((max(|base.x|, |lid.x|) - start) / (maximum - start), 0, 1)
//! smoothed = smoothed × ratio + reading × (1 - ratio)
//! ```
//!
//! # Angle convention
//!
//! ```text
//! angle = 180 - clockwise(base_flat, lid_flat, hinge)   (wrapped to [0, 360))
//! ```
//!
//! A closed lid reads ~0°, a laptop ~90-135°, a flat-open device 180° (both
//! sensors point down), and a lid folded all the way back ~360°.

use serde::{Deserialize, Serialize};

use crate::core::math::{clockwise_angle_between_degrees, normalize_degrees, Vector3, HINGE_AXIS};

/// Thresholds for smoothing and classifying hinge angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HingeEstimatorConfig {
    /// Hinge-parallel acceleration where smoothing begins (m/s²).
    pub smoothing_start: f32,

    /// Hinge-parallel acceleration above which new readings are ignored
    /// entirely and the angle is unreliable (m/s²).
    pub smoothing_maximum: f32,

    /// Lower bound of the trustworthy angle range (degrees).
    ///
    /// Near fully closed the sensors cannot tell 0° from 360°.
    pub min_stable_angle: f32,

    /// Upper bound of the trustworthy angle range (degrees).
    pub max_stable_angle: f32,

    /// Largest magnitude difference between the two readings for the update
    /// to be used (m/s²). Both sensors sit on one rigid body.
    pub noisy_magnitude_deviation: f32,
}

impl Default for HingeEstimatorConfig {
    fn default() -> Self {
        Self {
            smoothing_start: 7.0,
            smoothing_maximum: 8.7,
            min_stable_angle: 20.0,
            max_stable_angle: 340.0,
            noisy_magnitude_deviation: 1.0,
        }
    }
}

/// Result of folding one reading pair into the smoothed state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingStep {
    /// `max(|base.x|, |lid.x|)` of the raw readings (m/s²).
    pub largest_hinge_acceleration: f32,
    /// Retention weight applied to the previous smoothed state.
    pub smoothing_ratio: f32,
    /// False when the hinge is too close to vertical to trust any angle.
    pub is_reliable: bool,
}

/// Exponentially smoothed hinge angle estimator.
///
/// Holds one smoothed vector per half. Both start at zero and are only
/// changed by [`HingeAngleEstimator::smooth`].
#[derive(Debug, Clone)]
pub struct HingeAngleEstimator {
    config: HingeEstimatorConfig,
    base_smoothed: Vector3,
    lid_smoothed: Vector3,
}

impl HingeAngleEstimator {
    pub fn new(config: HingeEstimatorConfig) -> Self {
        Self {
            config,
            base_smoothed: Vector3::zero(),
            lid_smoothed: Vector3::zero(),
        }
    }

    pub fn config(&self) -> &HingeEstimatorConfig {
        &self.config
    }

    pub fn base_smoothed(&self) -> Vector3 {
        self.base_smoothed
    }

    pub fn lid_smoothed(&self) -> Vector3 {
        self.lid_smoothed
    }

    /// Retention weight for the given hinge-parallel acceleration, in [0, 1].
    pub fn smoothing_ratio(&self, largest_hinge_acceleration: f32) -> f32 {
        let span = self.config.smoothing_maximum - self.config.smoothing_start;
        if span <= 0.0 {
            return if largest_hinge_acceleration > self.config.smoothing_start {
                1.0
            } else {
                0.0
            };
        }
        ((largest_hinge_acceleration - self.config.smoothing_start) / span).clamp(0.0, 1.0)
    }

    /// Fold a reading pair into the smoothed vectors.
    pub fn smooth(&mut self, base: Vector3, lid: Vector3) -> SmoothingStep {
        let largest_hinge_acceleration = base.x.abs().max(lid.x.abs());
        let ratio = self.smoothing_ratio(largest_hinge_acceleration);

        self.base_smoothed = self.base_smoothed * ratio + base * (1.0 - ratio);
        self.lid_smoothed = self.lid_smoothed * ratio + lid * (1.0 - ratio);

        SmoothingStep {
            largest_hinge_acceleration,
            smoothing_ratio: ratio,
            is_reliable: largest_hinge_acceleration <= self.config.smoothing_maximum,
        }
    }

    /// Hinge angle of the current smoothed state in [0, 360).
    ///
    /// Returns `None` when either flattened vector is degenerate (e.g. before
    /// any reading, or with gravity exactly along the hinge).
    pub fn lid_angle(&self) -> Option<f32> {
        let base_flat = self.base_smoothed.flattened();
        let lid_flat = self.lid_smoothed.flattened();
        let clockwise = clockwise_angle_between_degrees(&base_flat, &lid_flat, &HINGE_AXIS)?;
        Some(normalize_degrees(180.0 - clockwise))
    }

    /// True when `degrees` lies in the trustworthy range.
    pub fn is_in_stable_range(&self, degrees: f32) -> bool {
        degrees >= self.config.min_stable_angle && degrees <= self.config.max_stable_angle
    }

    /// Stable means reliable, computable, and inside the trustworthy range.
    pub fn is_angle_stable(&self, degrees: Option<f32>, is_reliable: bool) -> bool {
        match degrees {
            Some(angle) => is_reliable && self.is_in_stable_range(angle),
            None => false,
        }
    }
}

impl Default for HingeAngleEstimator {
    fn default() -> Self {
        Self::new(HingeEstimatorConfig::default())
    }
}
