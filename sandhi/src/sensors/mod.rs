//! Sensor processing layer.
//!
//! Turns raw accelerometer pairs into a smoothed hinge angle and tracks how
//! long the angle has been untrustworthy.
//!
//! - [`hinge`]: Smoothing and hinge angle estimation
//! - [`debounce`]: Unstable-angle debounce window

pub mod debounce;
pub mod hinge;

pub use debounce::StabilityWindow;
pub use hinge::{HingeAngleEstimator, HingeEstimatorConfig, SmoothingStep};
