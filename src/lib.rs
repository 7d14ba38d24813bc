//! Camera-guided eyewear fitting measurements.
//!
//! This library validates a live capture sequence frame by frame and turns
//! the first stable, fully-aligned frame into a set of optical dispensing
//! measurements:
//! - pupillary distance (DP) and per-side naso-pupillary distances (DNP)
//! - per-side pupil-to-frame heights (altura)
//! - eyewear-frame width, lens height, diagonal, bridge width, and tilt
//!
//! The per-tick flow:
//! 1. [`pose::PoseAnalyzer`] extracts distance, yaw, pitch, and centering
//!    from the tracked face pose
//! 2. [`contour::FrameContourDetector`] filters the external vision
//!    collaborator's contour points into frame geometry
//! 3. [`pipeline::ValidationPipeline`] runs the ordered gate checks and
//!    reports progress, a hint, and a directional cue
//! 4. on a full pass, [`measurement::MeasurementEngine`] unprojects the
//!    frame geometry through the depth buffer
//!    ([`depth::DepthBuffer`] + [`camera::CameraIntrinsics`]) and computes
//!    the record
//! 5. [`capture::AutoCaptureController`] fires the capture once the
//!    passing state has held for the configured delay
//!
//! [`session::CaptureSession`] wires these together behind a single
//! `process_frame` call.
//!
//! # Example
//!
//! ```no_run
//! use image::RgbaImage;
//! use nalgebra::Point2;
//! use pupilometer::config::Config;
//! use pupilometer::contour::ContourSource;
//! use pupilometer::frame::{Capabilities, CameraMode};
//! use pupilometer::session::CaptureSession;
//!
//! /// Adapter over the platform's contour extraction
//! struct VisionAdapter;
//!
//! impl ContourSource for VisionAdapter {
//!     fn detect(&mut self, _image: &RgbaImage, _dark_on_light: bool) -> pupilometer::Result<Vec<Point2<f32>>> {
//!         // Run the platform edge/contour request here
//!         Ok(Vec::new())
//!     }
//! }
//!
//! # fn main() -> pupilometer::Result<()> {
//! let capabilities = Capabilities {
//!     face_tracking: true,
//!     scene_depth: true,
//! };
//! let mut session = CaptureSession::new(
//!     Config::default(),
//!     CameraMode::Front,
//!     capabilities,
//!     Box::new(VisionAdapter),
//! )?;
//!
//! // Per camera tick: build a FrameSnapshot from the frame source and
//! // hand it over.
//! //
//! // let event = session.process_frame(snapshot);
//! // render(event.progress, event.hint, event.cue);
//! // if let Some(capture) = event.capture {
//! //     store(capture.record, capture.image);
//! // }
//! # Ok(())
//! # }
//! ```

/// Camera model and 2-D↔3-D conversion
pub mod camera;

/// Auto-capture debounce state machine
pub mod capture;

/// Configuration management
pub mod config;

/// Constants used throughout the library
pub mod constants;

/// Eyewear-frame contour detection
pub mod contour;

/// Depth buffer access and sampling
pub mod depth;

/// Error types and result handling
pub mod error;

/// Per-tick frame snapshot types
pub mod frame;

/// Metric measurement computation
pub mod measurement;

/// Per-frame validation pipeline
pub mod pipeline;

/// Head pose analysis
pub mod pose;

/// Capture session coordination
pub mod session;

pub use error::{Error, Result};
