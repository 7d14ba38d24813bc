//! Configuration management for the capture pipeline

use crate::{constants, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capture pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Distance gate configuration
    pub distance: DistanceConfig,

    /// Head alignment configuration
    pub alignment: AlignmentConfig,

    /// Eyewear-frame contour detection configuration
    pub contour: ContourConfig,

    /// Capture timing configuration
    pub capture: CaptureConfig,
}

/// Accepted face-to-camera distance ranges per camera mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Minimum distance for the front camera (meters)
    pub front_min_m: f32,

    /// Maximum distance for the front camera (meters)
    pub front_max_m: f32,

    /// Minimum distance for the rear camera (meters)
    pub rear_min_m: f32,

    /// Maximum distance for the rear camera (meters)
    pub rear_max_m: f32,
}

/// Head pose and gaze alignment tolerances
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// Yaw tolerance (degrees)
    pub yaw_tolerance_deg: f32,

    /// Pitch tolerance (degrees)
    pub pitch_tolerance_deg: f32,

    /// Screen-space centering tolerance (pixels)
    pub center_tolerance_px: f32,

    /// Gaze direction component tolerance (unitless)
    pub gaze_tolerance: f32,
}

/// Eyewear-frame contour detection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourConfig {
    /// Minimum contour points for a usable detection
    pub min_points: usize,

    /// Primary contrast polarity: dark frame on light background
    pub dark_on_light: bool,

    /// Maximum frame tilt accepted by the level gate (degrees)
    pub max_tilt_deg: f32,

    /// Horizontal band around the pupil for altura lookup (pixels)
    pub altura_band_px: f32,
}

/// Capture timing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Debounce delay before auto-capture fires (seconds)
    pub auto_delay_secs: f64,

    /// Tilt below which the record reports the frame as aligned (degrees)
    pub alignment_tolerance_deg: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            distance: DistanceConfig::default(),
            alignment: AlignmentConfig::default(),
            contour: ContourConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            front_min_m: constants::FRONT_DISTANCE_MIN_M,
            front_max_m: constants::FRONT_DISTANCE_MAX_M,
            rear_min_m: constants::REAR_DISTANCE_MIN_M,
            rear_max_m: constants::REAR_DISTANCE_MAX_M,
        }
    }
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            yaw_tolerance_deg: constants::HEAD_ANGLE_TOLERANCE_DEG,
            pitch_tolerance_deg: constants::HEAD_ANGLE_TOLERANCE_DEG,
            center_tolerance_px: constants::CENTER_TOLERANCE_PX,
            gaze_tolerance: constants::GAZE_TOLERANCE,
        }
    }
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            min_points: constants::MIN_CONTOUR_POINTS,
            dark_on_light: true,
            max_tilt_deg: constants::MAX_TILT_DEG,
            altura_band_px: constants::ALTURA_BAND_PX,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            auto_delay_secs: constants::AUTO_CAPTURE_DELAY_SECS,
            alignment_tolerance_deg: constants::ALIGNMENT_TOLERANCE_DEG,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid field found.
    pub fn validate(&self) -> Result<()> {
        if self.distance.front_min_m <= 0.0 || self.distance.front_min_m >= self.distance.front_max_m {
            return Err(Error::ConfigError(
                "Front distance range must satisfy 0 < min < max".to_string(),
            ));
        }
        if self.distance.rear_min_m <= 0.0 || self.distance.rear_min_m >= self.distance.rear_max_m {
            return Err(Error::ConfigError(
                "Rear distance range must satisfy 0 < min < max".to_string(),
            ));
        }

        if self.alignment.yaw_tolerance_deg <= 0.0 || self.alignment.pitch_tolerance_deg <= 0.0 {
            return Err(Error::ConfigError(
                "Yaw/pitch tolerances must be greater than 0".to_string(),
            ));
        }
        if self.alignment.center_tolerance_px <= 0.0 {
            return Err(Error::ConfigError(
                "Centering tolerance must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.alignment.gaze_tolerance) {
            return Err(Error::ConfigError(
                "Gaze tolerance must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.contour.min_points == 0 {
            return Err(Error::ConfigError(
                "Minimum contour points must be greater than 0".to_string(),
            ));
        }
        if self.contour.max_tilt_deg <= 0.0 {
            return Err(Error::ConfigError("Maximum tilt must be greater than 0".to_string()));
        }
        if self.contour.altura_band_px <= 0.0 {
            return Err(Error::ConfigError("Altura band must be greater than 0".to_string()));
        }

        if self.capture.auto_delay_secs < 0.0 {
            return Err(Error::ConfigError("Auto-capture delay must not be negative".to_string()));
        }
        if self.capture.alignment_tolerance_deg <= 0.0 {
            return Err(Error::ConfigError(
                "Alignment tolerance must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Eyewear capture configuration

# Accepted face-to-camera distance per camera mode (meters)
distance:
  front_min_m: 0.35
  front_max_m: 0.80
  rear_min_m: 0.60
  rear_max_m: 1.20

# Head alignment tolerances
alignment:
  yaw_tolerance_deg: 1.7
  pitch_tolerance_deg: 1.7
  center_tolerance_px: 50.0
  gaze_tolerance: 0.1

# Eyewear-frame contour detection
contour:
  min_points: 10
  dark_on_light: true
  max_tilt_deg: 5.0
  altura_band_px: 4.0

# Capture timing
capture:
  auto_delay_secs: 3.0
  alignment_tolerance_deg: 1.5
"#;
