//! System configuration parameters
//!
//! All tunable parameters for the MlBeacon firmware.  Defaults match the
//! reference board; a JSON override can be baked in at build time through
//! `MLBEACON_CONFIG_JSON`.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Delay before retrying a transient advertising failure.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(150);

/// Minimum spacing between in-place advertising data updates.
pub const UPDATE_THROTTLE: Duration = Duration::from_millis(50);

/// Legacy advertising interval (both min and max).
pub const ADV_INTERVAL: Duration = Duration::from_millis(50);

/// Logical → physical LED mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedMap {
    /// LED showing the ML result / forwarder state.
    pub ml_state: u8,
    /// LED mirroring the simulated sensor signal, if fitted.
    pub sensor_sim: Option<u8>,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Debouncer ---
    /// Anomaly score above which a sample is an anomaly.
    pub anomaly_threshold: f32,
    /// Minimum confidence for a sample's own label to count.
    pub value_threshold: f32,
    /// Consecutive agreeing samples needed for a stable result.
    pub prediction_streak_threshold: u16,

    // --- Display ---
    pub display_ml_results: bool,
    pub display_sensor_sim: bool,
    pub display_data_forwarder: bool,

    // --- LEDs ---
    pub led_map: LedMap,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            anomaly_threshold: 0.1,
            value_threshold: 0.8,
            prediction_streak_threshold: 3,

            display_ml_results: true,
            display_sensor_sim: false,
            display_data_forwarder: true,

            // No sensor-sim LED on the reference board.
            led_map: LedMap {
                ml_state: 0,
                sensor_sim: None,
            },
        }
    }
}

impl SystemConfig {
    /// Check the configuration invariants.  Called once before the first
    /// event is served.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prediction_streak_threshold == 0 {
            return Err(ConfigError::StreakThresholdZero);
        }
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold < 0.0 {
            return Err(ConfigError::ThresholdOutOfRange("anomaly"));
        }
        if !self.value_threshold.is_finite() || self.value_threshold < 0.0 {
            return Err(ConfigError::ThresholdOutOfRange("value"));
        }
        if self.led_map.sensor_sim == Some(self.led_map.ml_state) {
            return Err(ConfigError::LedChannelConflict);
        }
        Ok(())
    }

    /// Parse a JSON override.  Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }
}
