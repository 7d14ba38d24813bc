//! Per-tick frame snapshot.
//!
//! The frame source builds one [`FrameSnapshot`] per camera tick; the
//! session consumes it synchronously and drops it before the next tick is
//! considered. Nothing here is buffered — a tick that arrives while the
//! previous one is still being evaluated is the frame source's problem, not
//! ours.

use crate::camera::CameraIntrinsics;
use crate::depth::DepthBuffer;
use crate::pose::{EyePair, FacePose};
use image::RgbaImage;
use nalgebra::Point3;
use std::time::Duration;

/// Which camera the session is driving.
///
/// The front camera has face tracking and eye transforms; the rear camera
/// relies on depth sampling for distance and a synthetic frame box when no
/// contour is detectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Front (true-depth) camera
    Front,
    /// Rear camera
    Rear,
}

/// What the capture device can deliver, checked once at session start.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Face pose and eye transforms are available
    pub face_tracking: bool,
    /// A per-frame metric depth buffer is available
    pub scene_depth: bool,
}

/// Everything one camera tick delivers. Owned by the tick, dropped after
/// processing.
pub struct FrameSnapshot {
    /// Time since session start; drives the auto-capture debounce
    pub timestamp: Duration,
    /// Camera intrinsics for this frame
    pub camera: CameraIntrinsics,
    /// Metric depth buffer, when the sensor delivered one this tick
    pub depth: Option<DepthBuffer>,
    /// Face pose in camera space, when tracked
    pub face: Option<FacePose>,
    /// Eye transforms in camera space, when tracked
    pub eyes: Option<EyePair>,
    /// Nose-bridge landmark in camera space, when the mesh provides one
    pub nose: Option<Point3<f32>>,
    /// Raw camera image; contour input and capture snapshot
    pub image: RgbaImage,
}

impl FrameSnapshot {
    /// Width of the camera image in pixels
    #[must_use]
    pub fn image_width(&self) -> u32 {
        self.image.width()
    }

    /// Height of the camera image in pixels
    #[must_use]
    pub fn image_height(&self) -> u32 {
        self.image.height()
    }
}
