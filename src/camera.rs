//! Camera model and 2-D↔3-D conversion.
//!
//! All 3-D geometry in this crate lives in camera space: x right, y down
//! (matching pixel rows), z forward along the optical axis. Face and eye
//! transforms handed to [`crate::frame::FrameSnapshot`] must already be
//! expressed in this frame so measured distances reduce to Euclidean
//! differences.

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Camera intrinsic parameters (pinhole model).
///
/// Projects a camera-space point `[X, Y, Z]` to pixel coordinates:
/// ```text
/// u = fx * X/Z + cx
/// v = fy * Y/Z + cy
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    /// Focal length in pixels (x direction)
    pub fx: f32,
    /// Focal length in pixels (y direction)
    pub fy: f32,
    /// Principal point x-coordinate in pixels
    pub cx: f32,
    /// Principal point y-coordinate in pixels
    pub cy: f32,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl CameraIntrinsics {
    /// Ideal pinhole camera with the principal point at the image center
    #[must_use]
    pub fn ideal(focal_length: f32, width: u32, height: u32) -> Self {
        Self {
            fx: focal_length,
            fy: focal_length,
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
            width,
            height,
        }
    }

    /// Viewport center in pixel coordinates
    #[must_use]
    pub fn viewport_center(&self) -> Point2<f32> {
        Point2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Unproject a pixel coordinate and sampled depth into a camera-space
    /// point.
    ///
    /// The depth is the metric z distance along the optical axis, so the
    /// result sits on the viewing ray through `(px, py)` at `z = depth`.
    #[must_use]
    pub fn unproject(&self, px: f32, py: f32, depth: f32) -> Point3<f32> {
        let x = (px - self.cx) / self.fx * depth;
        let y = (py - self.cy) / self.fy * depth;
        Point3::new(x, y, depth)
    }

    /// Project a camera-space point onto the viewport.
    ///
    /// Points at or behind the camera plane (`z <= 0`) have no meaningful
    /// projection and return `None`.
    #[must_use]
    pub fn project(&self, point: &Point3<f32>) -> Option<Point2<f32>> {
        if point.z <= 0.0 {
            return None;
        }
        Some(Point2::new(
            self.fx * point.x / point.z + self.cx,
            self.fy * point.y / point.z + self.cy,
        ))
    }
}
