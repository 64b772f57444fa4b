//! Core foundation layer.
//!
//! The bottom layer with no internal dependencies. All other layers depend
//! on core.
//!
//! # Contents
//!
//! - [`math`]: `Vector3` and hinge angle geometry
//! - [`types`]: Accelerometer updates, mode and switch types
//! - [`clock`]: Monotonic and wall-clock time sources

pub mod clock;
pub mod math;
pub mod types;
