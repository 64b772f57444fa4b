//! Decision engine layer.
//!
//! - [`controller`]: `TabletModeController`, the clamshell/tablet state machine
//! - [`observer`]: Transition listeners and their registry
//! - [`environment`]: Display state the controller queries

pub mod controller;
pub mod environment;
pub mod observer;

pub use controller::{ControllerConfig, TabletModeController};
pub use environment::{DeviceEnvironment, SharedDisplayState};
pub use observer::{ObserverList, TabletModeObserver};
