//! Telemetry sinks.
//!
//! The controller reports user actions, usage intervals and periodic lid
//! angle samples through [`MetricsSink`]. Hosts plug in their own backend;
//! [`InMemoryMetrics`] and [`LogMetrics`] cover tests, replay and the CLI.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use super::histogram::LinearHistogram;
use super::usage::UsageReport;
use crate::core::types::IntervalType;

/// Tablet mode was turned on.
pub const ACTION_TOUCHVIEW_ENABLED: &str = "Touchview_Enabled";
/// Tablet mode was turned off.
pub const ACTION_TOUCHVIEW_DISABLED: &str = "Touchview_Disabled";
/// Emitted once at shell start on tablet-capable devices.
pub const ACTION_TOUCHVIEW_INITIALLY_DISABLED: &str = "Touchview_Initially_Disabled";

/// Destination for controller telemetry.
pub trait MetricsSink: Send {
    fn record_action(&mut self, action: &str);

    fn record_usage_interval(&mut self, kind: IntervalType, duration: Duration);

    /// `degrees` is the lid angle rounded to the nearest integer.
    fn record_lid_angle(&mut self, degrees: u32);

    fn record_usage_totals(&mut self, report: &UsageReport);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn record_action(&mut self, _action: &str) {}
    fn record_usage_interval(&mut self, _kind: IntervalType, _duration: Duration) {}
    fn record_lid_angle(&mut self, _degrees: u32) {}
    fn record_usage_totals(&mut self, _report: &UsageReport) {}
}

/// Sink that writes every record through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMetrics;

impl MetricsSink for LogMetrics {
    fn record_action(&mut self, action: &str) {
        log::info!("[Metrics] action {}", action);
    }

    fn record_usage_interval(&mut self, kind: IntervalType, duration: Duration) {
        log::debug!("[Metrics] {:?} interval {:.1}s", kind, duration.as_secs_f64());
    }

    fn record_lid_angle(&mut self, degrees: u32) {
        log::debug!("[Metrics] lid angle {}°", degrees);
    }

    fn record_usage_totals(&mut self, report: &UsageReport) {
        match report.active_percentage {
            Some(pct) => log::info!(
                "[Metrics] usage: {} min tablet, {} min clamshell ({}% tablet)",
                report.active_minutes(),
                report.inactive_minutes(),
                pct
            ),
            None => log::info!("[Metrics] usage: no runtime recorded"),
        }
    }
}

/// Forwards every record to each inner sink in order.
#[derive(Default)]
pub struct MetricsFanout {
    sinks: Vec<Box<dyn MetricsSink>>,
}

impl MetricsFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn MetricsSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl MetricsSink for MetricsFanout {
    fn record_action(&mut self, action: &str) {
        for sink in &mut self.sinks {
            sink.record_action(action);
        }
    }

    fn record_usage_interval(&mut self, kind: IntervalType, duration: Duration) {
        for sink in &mut self.sinks {
            sink.record_usage_interval(kind, duration);
        }
    }

    fn record_lid_angle(&mut self, degrees: u32) {
        for sink in &mut self.sinks {
            sink.record_lid_angle(degrees);
        }
    }

    fn record_usage_totals(&mut self, report: &UsageReport) {
        for sink in &mut self.sinks {
            sink.record_usage_totals(report);
        }
    }
}

/// Everything an [`InMemoryMetrics`] sink has seen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    /// Actions in emission order.
    pub actions: Vec<String>,
    pub intervals: Vec<(IntervalType, Duration)>,
    pub lid_angles: Vec<u32>,
    pub lid_angle_histogram: LinearHistogram,
    pub totals: Option<UsageReport>,
}

impl MetricsSnapshot {
    pub fn action_count(&self, action: &str) -> usize {
        self.actions.iter().filter(|a| a.as_str() == action).count()
    }

    /// Per-action counts, sorted by name.
    pub fn action_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for action in &self.actions {
            *counts.entry(action.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn interval_total(&self, kind: IntervalType) -> Duration {
        self.intervals
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, d)| *d)
            .sum()
    }
}

/// Recording sink.
///
/// Clones share storage, so a test keeps one handle and hands another to
/// the controller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    inner: Arc<Mutex<MetricsSnapshot>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().clone()
    }

    pub fn action_count(&self, action: &str) -> usize {
        self.inner.lock().action_count(action)
    }

    pub fn actions(&self) -> Vec<String> {
        self.inner.lock().actions.clone()
    }

    pub fn intervals(&self) -> Vec<(IntervalType, Duration)> {
        self.inner.lock().intervals.clone()
    }

    pub fn lid_angles(&self) -> Vec<u32> {
        self.inner.lock().lid_angles.clone()
    }

    pub fn lid_angle_histogram(&self) -> LinearHistogram {
        self.inner.lock().lid_angle_histogram.clone()
    }

    pub fn totals(&self) -> Option<UsageReport> {
        self.inner.lock().totals
    }

    pub fn clear(&self) {
        *self.inner.lock() = MetricsSnapshot::default();
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_action(&mut self, action: &str) {
        self.inner.lock().actions.push(action.to_string());
    }

    fn record_usage_interval(&mut self, kind: IntervalType, duration: Duration) {
        self.inner.lock().intervals.push((kind, duration));
    }

    fn record_lid_angle(&mut self, degrees: u32) {
        let mut inner = self.inner.lock();
        inner.lid_angles.push(degrees);
        inner.lid_angle_histogram.record(degrees);
    }

    fn record_usage_totals(&mut self, report: &UsageReport) {
        self.inner.lock().totals = Some(*report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_shared_between_clones() {
        let metrics = InMemoryMetrics::new();
        let mut sink = metrics.clone();

        sink.record_action(ACTION_TOUCHVIEW_ENABLED);
        sink.record_action(ACTION_TOUCHVIEW_DISABLED);
        sink.record_action(ACTION_TOUCHVIEW_ENABLED);

        assert_eq!(metrics.action_count(ACTION_TOUCHVIEW_ENABLED), 2);
        assert_eq!(metrics.actions().len(), 3);
        let counts = metrics.snapshot().action_counts();
        assert_eq!(counts.get(ACTION_TOUCHVIEW_DISABLED), Some(&1));
    }

    #[test]
    fn test_lid_angles_feed_histogram() {
        let metrics = InMemoryMetrics::new();
        let mut sink = metrics.clone();

        sink.record_lid_angle(90);
        sink.record_lid_angle(270);

        assert_eq!(metrics.lid_angles(), vec![90, 270]);
        let histogram = metrics.lid_angle_histogram();
        assert_eq!(histogram.total_count(), 2);
        assert_eq!(histogram.count_for(270), 1);
    }

    #[test]
    fn test_interval_totals() {
        let metrics = InMemoryMetrics::new();
        let mut sink = metrics.clone();

        sink.record_usage_interval(IntervalType::Active, Duration::from_secs(30));
        sink.record_usage_interval(IntervalType::Inactive, Duration::from_secs(10));
        sink.record_usage_interval(IntervalType::Active, Duration::from_secs(30));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.interval_total(IntervalType::Active), Duration::from_secs(60));
        assert_eq!(snapshot.interval_total(IntervalType::Inactive), Duration::from_secs(10));
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = InMemoryMetrics::new();
        let second = InMemoryMetrics::new();
        let mut fanout = MetricsFanout::new()
            .with(Box::new(first.clone()))
            .with(Box::new(LogMetrics))
            .with(Box::new(second.clone()));
        assert_eq!(fanout.len(), 3);

        fanout.record_action(ACTION_TOUCHVIEW_INITIALLY_DISABLED);
        fanout.record_lid_angle(180);

        assert_eq!(first.actions(), second.actions());
        assert_eq!(second.lid_angles(), vec![180]);
    }

    #[test]
    fn test_totals_and_clear() {
        let metrics = InMemoryMetrics::new();
        let mut sink = metrics.clone();
        let report = UsageReport::new(Duration::from_secs(60), Duration::from_secs(60));

        sink.record_usage_totals(&report);
        assert_eq!(metrics.totals(), Some(report));

        metrics.clear();
        assert!(metrics.totals().is_none());
        assert!(metrics.actions().is_empty());
    }
}
