//! Vector math for accelerometer readings.
//!
//! Readings are 3-axis accelerations in m/s². The hinge of a convertible
//! device runs along the X axis of both sensors, so the angle between the
//! base and lid halves is measured around `HINGE_AXIS`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Below this length a vector has no usable direction.
pub const DEGENERATE_LENGTH: f32 = f32::EPSILON;

/// Unit vector along the hinge (shared X axis of both accelerometers).
pub const HINGE_AXIS: Vector3 = Vector3 {
    x: 1.0,
    y: 0.0,
    z: 0.0,
};

/// A 3D vector in m/s².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product `self × other`.
    #[inline]
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline]
    pub fn scale(&self, factor: f32) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Copy of this vector with the X (hinge-parallel) component removed.
    #[inline]
    pub fn flattened(&self) -> Vector3 {
        Vector3::new(0.0, self.y, self.z)
    }

    /// True when the vector is too short to define a direction.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        // NaN components count as degenerate
        !(self.length() >= DEGENERATE_LENGTH)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    #[inline]
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    #[inline]
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: f32) -> Vector3 {
        self.scale(rhs)
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Vector3::new(v[0], v[1], v[2])
    }
}

/// Unsigned angle between two vectors in degrees, in [0, 180].
///
/// Returns `None` when either vector is degenerate. The cosine is clamped to
/// [-1, 1] so rounding never produces NaN.
pub fn angle_between_degrees(a: &Vector3, b: &Vector3) -> Option<f32> {
    if a.is_degenerate() || b.is_degenerate() {
        return None;
    }
    let cos = (a.dot(b) / a.length() / b.length()).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Clockwise angle from `base` to `other` around `normal`, in [0, 360).
///
/// The unsigned angle is reversed (`360 - angle`) when the shortest rotation
/// from `base` to `other` is counter-clockwise with respect to `normal`.
pub fn clockwise_angle_between_degrees(
    base: &Vector3,
    other: &Vector3,
    normal: &Vector3,
) -> Option<f32> {
    let angle = angle_between_degrees(base, other)?;
    if base.cross(other).dot(normal) > 0.0 {
        Some(360.0 - angle)
    } else {
        Some(angle)
    }
}

/// Wrap an angle in degrees into [0, 360).
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        // -0.0001 % 360 + 360 rounds to 360.0 in f32
        let shifted = wrapped + 360.0;
        if shifted >= 360.0 {
            0.0
        } else {
            shifted
        }
    } else {
        wrapped
    }
}
