//! Constants used throughout the library

/// Distance range for the front (true-depth) camera, in meters
pub const FRONT_DISTANCE_MIN_M: f32 = 0.35;
/// Upper bound of the front-camera distance range, in meters
pub const FRONT_DISTANCE_MAX_M: f32 = 0.80;

/// Distance range for the rear camera, in meters
pub const REAR_DISTANCE_MIN_M: f32 = 0.60;
/// Upper bound of the rear-camera distance range, in meters
pub const REAR_DISTANCE_MAX_M: f32 = 1.20;

/// Head rotation tolerance for yaw and pitch, in degrees (≈0.03 rad)
pub const HEAD_ANGLE_TOLERANCE_DEG: f32 = 1.7;

/// Screen-space centering tolerance, in pixels
pub const CENTER_TOLERANCE_PX: f32 = 50.0;

/// Gaze direction tolerance (unitless direction components)
pub const GAZE_TOLERANCE: f32 = 0.1;

/// Maximum eyewear-frame tilt accepted by the level gate, in degrees
pub const MAX_TILT_DEG: f32 = 5.0;

/// Tilt below which a measurement is reported as aligned, in degrees
pub const ALIGNMENT_TOLERANCE_DEG: f32 = 1.5;

/// Debounce delay before an automatic capture fires, in seconds
pub const AUTO_CAPTURE_DELAY_SECS: f64 = 3.0;

/// Minimum contour points for a usable eyewear-frame detection
pub const MIN_CONTOUR_POINTS: usize = 10;

/// Horizontal band around each pupil when searching the frame's lower
/// edge for the altura measurement, in pixels
pub const ALTURA_BAND_PX: f32 = 4.0;

/// Nominal eyewear-frame front width used for the rear-camera synthetic
/// detection, in millimeters
pub const NOMINAL_FRAME_WIDTH_MM: f32 = 130.0;

/// Nominal eyewear-frame lens height used for the rear-camera synthetic
/// detection, in millimeters
pub const NOMINAL_FRAME_HEIGHT_MM: f32 = 40.0;

/// Meters-to-millimeters scale applied to every metric output
pub const METERS_TO_MM: f32 = 1000.0;

/// Total number of validation gates
pub const GATE_COUNT: u8 = 8;
