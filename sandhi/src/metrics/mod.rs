//! Telemetry layer.
//!
//! - [`usage`]: Wall-clock tablet/clamshell usage accounting
//! - [`histogram`]: Linear lid angle histogram
//! - [`timer`]: Polled repeating timer for periodic samples
//! - [`sink`]: `MetricsSink` trait plus recording and logging sinks

pub mod histogram;
pub mod sink;
pub mod timer;
pub mod usage;

pub use histogram::LinearHistogram;
pub use sink::{
    InMemoryMetrics, LogMetrics, MetricsFanout, MetricsSink, MetricsSnapshot, NullMetrics,
    ACTION_TOUCHVIEW_DISABLED, ACTION_TOUCHVIEW_ENABLED, ACTION_TOUCHVIEW_INITIALLY_DISABLED,
};
pub use timer::RepeatingTimer;
pub use usage::{UsageReport, UsageTracker};
