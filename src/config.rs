// Timeouts, topics, drivetrain geometry and calibration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::drive::{DriveError, Drivetrain};
use crate::encoder::EncodingType;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_DRIVE: &str = "drivetrain/cmd"; // commands
pub const TOPIC_TELEMETRY: &str = "drivetrain/telemetry"; // measured speeds/distances
pub const TOPIC_HEALTH: &str = "drivetrain/state/health"; // health status

/// Wheel radius in meters (6" wheel)
pub const WHEEL_RADIUS: f64 = 0.0762;

/// Encoder pulses per wheel revolution
pub const PULSES_PER_REVOLUTION: f64 = 360.0;

/// Wheel travel per encoder pulse, in meters
pub const DISTANCE_PER_PULSE: f64 = 2.0 * std::f64::consts::PI * WHEEL_RADIUS / PULSES_PER_REVOLUTION;

/// Below this measured speed the equalizer leaves both sides unscaled
pub const NO_SCALE_SPEED: f64 = 0.1;

/// Errors loading or validating a drivetrain config
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field}: {value}")]
    Invalid { field: &'static str, value: f64 },

    #[error(transparent)]
    Drive(#[from] DriveError),
}

/// One side of the drivetrain: motor channel plus encoder wiring and calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SideConfig {
    pub name: String,
    pub motor_channel: u8,
    pub encoder_channels: (u8, u8),
    pub distance_per_pulse: f64,
    pub encoding: EncodingType,
    /// Per-device scale on top of the encoding multiplier (1.0 = nominal)
    pub calibration: f64,
    pub reverse_direction: bool,
}

impl SideConfig {
    fn new(name: &str, motor_channel: u8, encoder_channels: (u8, u8)) -> Self {
        Self {
            name: name.to_string(),
            motor_channel,
            encoder_channels,
            distance_per_pulse: DISTANCE_PER_PULSE,
            encoding: EncodingType::K1X,
            calibration: 1.0,
            reverse_direction: false,
        }
    }
}

impl Default for SideConfig {
    fn default() -> Self {
        Self::new("side", 0, (0, 0))
    }
}

/// Slip compensation settings; absent means no equalization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqualizerConfig {
    pub no_scale_speed: f64,
}

impl Default for EqualizerConfig {
    fn default() -> Self {
        Self {
            no_scale_speed: NO_SCALE_SPEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrivetrainConfig {
    pub wheel_radius: f64,
    pub left: SideConfig,
    pub right: SideConfig,
    pub equalizer: Option<EqualizerConfig>,
}

impl Default for DrivetrainConfig {
    fn default() -> Self {
        Self {
            wheel_radius: WHEEL_RADIUS,
            left: SideConfig::new("left", 1, (5, 6)),
            right: SideConfig::new("right", 2, (7, 8)),
            equalizer: None,
        }
    }
}

impl DrivetrainConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading drivetrain config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.wheel_radius > 0.0 && self.wheel_radius.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "wheel_radius",
                value: self.wheel_radius,
            });
        }

        for side in [&self.left, &self.right] {
            if !side.distance_per_pulse.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "distance_per_pulse",
                    value: side.distance_per_pulse,
                });
            }
            if !(side.calibration > 0.0 && side.calibration.is_finite()) {
                return Err(ConfigError::Invalid {
                    field: "calibration",
                    value: side.calibration,
                });
            }
        }

        if let Some(equalizer) = &self.equalizer {
            if equalizer.no_scale_speed.is_nan() || equalizer.no_scale_speed < 0.0 {
                return Err(ConfigError::Invalid {
                    field: "no_scale_speed",
                    value: equalizer.no_scale_speed,
                });
            }
        }

        Ok(())
    }

    /// Validate, then assemble the drivetrain this config describes
    pub fn build(&self) -> Result<Drivetrain, ConfigError> {
        self.validate()?;
        Ok(Drivetrain::from_config(self)?)
    }
}
