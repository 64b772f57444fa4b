//! Configuration for Sandhi
//!
//! Loads thresholds and startup policy from a TOML file. Every section and
//! field is optional; omitted values take the defaults below.
//!
//! ```toml
//! [hinge]
//! smoothing_start = 7.0
//! smoothing_maximum = 8.7
//! min_stable_angle = 20.0
//! max_stable_angle = 340.0
//! noisy_magnitude_deviation = 1.0
//!
//! [mode]
//! enter_angle = 200.0
//! exit_angle = 160.0
//! unstable_lid_angle_duration_ms = 2000
//! ui_mode = "auto"            # auto | clamshell | tablet
//! tablet_mode_capable = true
//!
//! [telemetry]
//! record_lid_angle_interval_secs = 3600
//!
//! [logging]
//! level = "info"
//! ```

use crate::core::types::UiMode;
use crate::engine::ControllerConfig;
use crate::error::{Error, Result};
use crate::sensors::HingeEstimatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Longest accepted debounce or sampling interval (7 days)
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SandhiConfig {
    #[serde(default)]
    pub hinge: HingeEstimatorConfig,
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Mode decision thresholds and startup policy
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModeConfig {
    /// Lid angle that enters tablet mode in degrees (default: 200)
    #[serde(default = "default_enter_angle")]
    pub enter_angle: f32,

    /// Stable lid angle that leaves tablet mode in degrees (default: 160)
    #[serde(default = "default_exit_angle")]
    pub exit_angle: f32,

    /// Unstable angle debounce in milliseconds (default: 2000)
    #[serde(default = "default_unstable_duration_ms")]
    pub unstable_lid_angle_duration_ms: u64,

    /// Forced UI mode (default: auto)
    #[serde(default)]
    pub ui_mode: UiMode,

    /// Convertible or slate with an accelerometer (default: true)
    #[serde(default = "default_tablet_mode_capable")]
    pub tablet_mode_capable: bool,
}

/// Telemetry settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Lid angle sample period in seconds (default: 3600)
    #[serde(default = "default_record_interval_secs")]
    pub record_lid_angle_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_enter_angle() -> f32 {
    200.0
}
fn default_exit_angle() -> f32 {
    160.0
}
fn default_unstable_duration_ms() -> u64 {
    2000
}
fn default_tablet_mode_capable() -> bool {
    true
}
fn default_record_interval_secs() -> u64 {
    3600
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            enter_angle: default_enter_angle(),
            exit_angle: default_exit_angle(),
            unstable_lid_angle_duration_ms: default_unstable_duration_ms(),
            ui_mode: UiMode::default(),
            tablet_mode_capable: default_tablet_mode_capable(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            record_lid_angle_interval_secs: default_record_interval_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl SandhiConfig {
    /// Load and validate configuration from a TOML file
    ///
    /// # Example
    /// ```no_run
    /// use sandhi::config::SandhiConfig;
    ///
    /// let config = SandhiConfig::from_file("sandhi.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: SandhiConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check that thresholds are ordered and durations positive and bounded
    pub fn validate(&self) -> Result<()> {
        let hinge = &self.hinge;
        let mode = &self.mode;

        let all_finite = [
            hinge.smoothing_start,
            hinge.smoothing_maximum,
            hinge.min_stable_angle,
            hinge.max_stable_angle,
            hinge.noisy_magnitude_deviation,
            mode.enter_angle,
            mode.exit_angle,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::Config("thresholds must be finite".to_string()));
        }

        if hinge.smoothing_start >= hinge.smoothing_maximum {
            return Err(Error::Config(format!(
                "hinge.smoothing_start ({}) must be below hinge.smoothing_maximum ({})",
                hinge.smoothing_start, hinge.smoothing_maximum
            )));
        }
        if hinge.min_stable_angle >= hinge.max_stable_angle {
            return Err(Error::Config(format!(
                "hinge.min_stable_angle ({}) must be below hinge.max_stable_angle ({})",
                hinge.min_stable_angle, hinge.max_stable_angle
            )));
        }
        if hinge.noisy_magnitude_deviation <= 0.0 {
            return Err(Error::Config(
                "hinge.noisy_magnitude_deviation must be positive".to_string(),
            ));
        }
        if mode.exit_angle >= mode.enter_angle {
            return Err(Error::Config(format!(
                "mode.exit_angle ({}) must be below mode.enter_angle ({})",
                mode.exit_angle, mode.enter_angle
            )));
        }
        if !(0.0..=360.0).contains(&mode.exit_angle) || !(0.0..=360.0).contains(&mode.enter_angle)
        {
            return Err(Error::Config(
                "mode angles must lie within [0, 360]".to_string(),
            ));
        }
        if mode.unstable_lid_angle_duration_ms == 0 {
            return Err(Error::Config(
                "mode.unstable_lid_angle_duration_ms must be positive".to_string(),
            ));
        }
        if mode.unstable_lid_angle_duration_ms > MAX_INTERVAL_SECS * 1000 {
            return Err(Error::Config(format!(
                "mode.unstable_lid_angle_duration_ms ({}) exceeds {} ms",
                mode.unstable_lid_angle_duration_ms,
                MAX_INTERVAL_SECS * 1000
            )));
        }
        let interval = self.telemetry.record_lid_angle_interval_secs;
        if interval == 0 {
            return Err(Error::Config(
                "telemetry.record_lid_angle_interval_secs must be positive".to_string(),
            ));
        }
        if interval > MAX_INTERVAL_SECS {
            return Err(Error::Config(format!(
                "telemetry.record_lid_angle_interval_secs ({}) exceeds {} s",
                interval, MAX_INTERVAL_SECS
            )));
        }
        Ok(())
    }

    /// Controller settings derived from this configuration
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            enter_angle: self.mode.enter_angle,
            exit_angle: self.mode.exit_angle,
            unstable_lid_angle_duration: Duration::from_millis(
                self.mode.unstable_lid_angle_duration_ms,
            ),
            record_lid_angle_interval: Duration::from_secs(
                self.telemetry.record_lid_angle_interval_secs,
            ),
            ui_mode: self.mode.ui_mode,
            tablet_mode_capable: self.mode.tablet_mode_capable,
            estimator: self.hinge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_controller_defaults() {
        let config = SandhiConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.controller_config(), ControllerConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = SandhiConfig::from_toml("").unwrap();
        assert_eq!(config, SandhiConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = SandhiConfig::from_toml(
            r#"
            [mode]
            ui_mode = "tablet"
            unstable_lid_angle_duration_ms = 500

            [hinge]
            min_stable_angle = 25.0
            "#,
        )
        .unwrap();

        assert_eq!(config.mode.ui_mode, UiMode::Tablet);
        assert_eq!(config.mode.enter_angle, 200.0);
        assert_eq!(config.hinge.min_stable_angle, 25.0);
        assert_eq!(config.hinge.max_stable_angle, 340.0);

        let controller = config.controller_config();
        assert_eq!(controller.unstable_lid_angle_duration, Duration::from_millis(500));
        assert_eq!(controller.estimator.min_stable_angle, 25.0);
    }

    #[test]
    fn test_validation_rejects_inverted_thresholds() {
        let mut config = SandhiConfig::default();
        config.mode.exit_angle = 210.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = SandhiConfig::default();
        config.hinge.smoothing_start = 9.0;
        assert!(config.validate().is_err());

        let mut config = SandhiConfig::default();
        config.hinge.min_stable_angle = 350.0;
        assert!(config.validate().is_err());

        let mut config = SandhiConfig::default();
        config.telemetry.record_lid_angle_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = SandhiConfig::default();
        config.mode.enter_angle = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_bounds_intervals() {
        let err = SandhiConfig::from_toml(
            "[telemetry]\nrecord_lid_angle_interval_secs = 9223372036854775807",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            SandhiConfig::from_toml("[mode]\nunstable_lid_angle_duration_ms = 604800001")
                .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let week = format!(
            "[mode]\nunstable_lid_angle_duration_ms = {}\n\n[telemetry]\nrecord_lid_angle_interval_secs = {}",
            MAX_INTERVAL_SECS * 1000,
            MAX_INTERVAL_SECS
        );
        assert!(SandhiConfig::from_toml(&week).is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = SandhiConfig::from_toml("[mode]\nenter_angle = \"wide\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sandhi.toml");

        let mut config = SandhiConfig::default();
        config.mode.ui_mode = UiMode::Clamshell;
        config.logging.level = "debug".to_string();
        config.to_file(&path).unwrap();

        let loaded = SandhiConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = SandhiConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
