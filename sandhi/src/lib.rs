//! Sandhi - Hinge angle estimation and tablet-mode decisions for convertibles
//!
//! A convertible laptop carries one accelerometer in the keyboard half
//! (base) and one in the screen half (lid). Sandhi smooths the pair,
//! derives the hinge angle, and decides when the UI should switch between
//! clamshell and tablet mode.
//!
//! # Architecture
//!
//! The crate is organized into 5 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      bin/                           │  ← Trace replay CLI
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │                 (trace, replay)                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Decisions
//! │        (controller, observers, environment)         │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   metrics/                          │  ← Telemetry
//! │         (usage, histogram, timer, sinks)            │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │               (hinge, debounce)                     │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │              (math, types, clock)                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Pipeline
//!
//! 1. Low-pass both accelerometer vectors. The filter weight rises as the
//!    hinge turns toward vertical, where the angle is ill-defined.
//! 2. Project out the hinge axis and measure the clockwise angle between
//!    base and lid.
//! 3. Apply hysteresis (enter at 200°, leave at 160°) and a 2 s debounce
//!    for angles that are unreliable or near the closed/flat extremes.
//! 4. Let the lid switch, the hardware tablet switch, an external mouse and
//!    docked mode override the sensors.

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Telemetry (depends on core)
// ============================================================================
pub mod metrics;

// ============================================================================
// Layer 4: Decision engine (depends on core, sensors, metrics)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 5: I/O infrastructure (depends on all layers)
// ============================================================================
pub mod io;

// Cross-cutting
pub mod config;
pub mod error;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core
pub use core::clock::{Clock, ManualClock, SystemClock};
pub use core::math::{self, Vector3};
pub use core::types::{
    AccelerometerReading, AccelerometerSource, AccelerometerUpdate, IntervalType, LidState,
    SwitchStates, TabletModeState, TabletSwitch, UiMode,
};

// Sensors
pub use sensors::{HingeAngleEstimator, HingeEstimatorConfig, StabilityWindow};

// Metrics
pub use metrics::{
    InMemoryMetrics, LinearHistogram, LogMetrics, MetricsSink, NullMetrics, UsageReport,
};

// Engine
pub use engine::{
    ControllerConfig, DeviceEnvironment, SharedDisplayState, TabletModeController,
    TabletModeObserver,
};

// I/O
pub use io::{Replayer, ReplaySummary, TraceEvent};

// Configuration and errors
pub use config::SandhiConfig;
pub use error::{Error, Result};
