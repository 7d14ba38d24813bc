//! Helper functions and synthetic frame builders for tests
#![allow(dead_code)]

use image::RgbaImage;
use nalgebra::{Point2, Point3};
use pupilometer::camera::CameraIntrinsics;
use pupilometer::contour::ContourSource;
use pupilometer::depth::DepthBuffer;
use pupilometer::frame::FrameSnapshot;
use pupilometer::pose::{EyePair, FacePose};
use std::time::Duration;

pub const IMAGE_WIDTH: u32 = 640;
pub const IMAGE_HEIGHT: u32 = 480;
pub const FOCAL_PX: f32 = 500.0;

/// Interpupillary half-spacing used by the synthetic face, in meters
pub const EYE_HALF_SPACING_M: f32 = 0.031;

pub fn intrinsics() -> CameraIntrinsics {
    CameraIntrinsics::ideal(FOCAL_PX, IMAGE_WIDTH, IMAGE_HEIGHT)
}

/// Constant-depth buffer covering the whole viewport
pub fn constant_depth(depth_m: f32) -> DepthBuffer {
    DepthBuffer::packed(
        vec![depth_m; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize],
        IMAGE_WIDTH as usize,
        IMAGE_HEIGHT as usize,
    )
    .expect("constant buffer dimensions are consistent")
}

/// A snapshot of a well-aligned face at the given distance and timestamp
pub fn aligned_snapshot(distance_m: f32, timestamp: Duration) -> FrameSnapshot {
    FrameSnapshot {
        timestamp,
        camera: intrinsics(),
        depth: Some(constant_depth(distance_m)),
        face: Some(FacePose::from_angles(Point3::new(0.0, 0.0, distance_m), 0.0, 0.0)),
        eyes: Some(EyePair::looking_ahead(
            Point3::new(-EYE_HALF_SPACING_M, 0.0, distance_m),
            Point3::new(EYE_HALF_SPACING_M, 0.0, distance_m),
        )),
        nose: None,
        image: RgbaImage::new(IMAGE_WIDTH, IMAGE_HEIGHT),
    }
}

/// Same face, arbitrary head angles
pub fn angled_snapshot(distance_m: f32, yaw_deg: f32, pitch_deg: f32, timestamp: Duration) -> FrameSnapshot {
    let mut snapshot = aligned_snapshot(distance_m, timestamp);
    snapshot.face = Some(FacePose::from_angles(
        Point3::new(0.0, 0.0, distance_m),
        yaw_deg,
        pitch_deg,
    ));
    snapshot
}

/// Contour source producing a level rectangle outline of the given metric
/// size, centered in the image, as seen at the given depth.
pub struct RectangleFrameSource {
    pub width_m: f32,
    pub height_m: f32,
    pub depth_m: f32,
    /// Vertical pixel drop applied to the right half, to simulate tilt
    pub right_drop_px: f32,
}

impl RectangleFrameSource {
    pub fn level(width_m: f32, height_m: f32, depth_m: f32) -> Self {
        Self {
            width_m,
            height_m,
            depth_m,
            right_drop_px: 0.0,
        }
    }
}

impl ContourSource for RectangleFrameSource {
    fn detect(&mut self, _image: &RgbaImage, dark_on_light: bool) -> pupilometer::Result<Vec<Point2<f32>>> {
        if !dark_on_light {
            return Ok(Vec::new());
        }
        let half_w = self.width_m / 2.0 * FOCAL_PX / self.depth_m / IMAGE_WIDTH as f32;
        let half_h = self.height_m / 2.0 * FOCAL_PX / self.depth_m / IMAGE_HEIGHT as f32;
        let drop = self.right_drop_px / IMAGE_HEIGHT as f32;

        let mut points = Vec::new();
        for i in 0..16 {
            let t = i as f32 / 15.0;
            let x = 0.5 - half_w + t * 2.0 * half_w;
            // Normalized y grows upward; a pixel-space drop subtracts
            let tilt = if x > 0.5 { drop * (x - 0.5) / half_w } else { 0.0 };
            points.push(Point2::new(x, 0.5 + half_h - tilt));
            points.push(Point2::new(x, 0.5 - half_h - tilt));
        }
        Ok(points)
    }
}

/// Contour source that never detects anything
pub struct NoFrameSource;

impl ContourSource for NoFrameSource {
    fn detect(&mut self, _image: &RgbaImage, _dark_on_light: bool) -> pupilometer::Result<Vec<Point2<f32>>> {
        Ok(Vec::new())
    }
}
