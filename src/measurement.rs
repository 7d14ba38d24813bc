//! Metric measurement computation.
//!
//! Runs once per fully-validated tick: unprojects the detected frame
//! geometry through the depth buffer and combines it with the tracked eye
//! positions into the final record. Every distance is a Euclidean
//! difference between camera-space points, scaled from meters to
//! millimeters.

use crate::camera::CameraIntrinsics;
use crate::config::Config;
use crate::constants::METERS_TO_MM;
use crate::contour::FrameDetection;
use crate::depth::DepthGuard;
use crate::frame::FrameSnapshot;
use crate::pipeline::MeasurementContext;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// The final measurement set, immutable once produced.
///
/// All values are millimeters except `distance_cm`. Manual adjustment
/// downstream derives a new record; an existing one is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Face distance from the camera at capture time (centimeters)
    pub distance_cm: f32,
    /// Pupillary distance: between the eye centers
    pub dp_mm: f32,
    /// Naso-pupillary distance, left eye to nose reference
    pub dnp_left_mm: f32,
    /// Naso-pupillary distance, right eye to nose reference
    pub dnp_right_mm: f32,
    /// Vertical distance from the left pupil to the frame's lower edge
    pub alt_left_mm: f32,
    /// Vertical distance from the right pupil to the frame's lower edge
    pub alt_right_mm: f32,
    /// Frame front width
    pub horizontal_mm: f32,
    /// Lens height
    pub vertical_mm: f32,
    /// Frame diagonal, bottom-left to top-right
    pub diagonal_mm: f32,
    /// Bridge width between the lens outlines
    pub bridge_mm: f32,
    /// Signed tilt of the frame's bottom edge (degrees)
    pub tilt_deg: f32,
    /// True when the tilt is within the alignment tolerance
    pub aligned: bool,
}

/// Computes a [`MeasurementRecord`] from a fully-validated tick.
pub struct MeasurementEngine {
    altura_band_px: f32,
    alignment_tolerance_deg: f32,
}

impl MeasurementEngine {
    /// Create an engine with the configured tolerances
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            altura_band_px: config.contour.altura_band_px,
            alignment_tolerance_deg: config.capture.alignment_tolerance_deg,
        }
    }

    /// Compute the measurement record for a tick that passed every gate.
    ///
    /// Returns `None` when the snapshot carries no depth buffer, which the
    /// pipeline rules out before handing over a context.
    #[must_use]
    pub fn measure(&self, snapshot: &FrameSnapshot, ctx: &MeasurementContext) -> Option<MeasurementRecord> {
        let depth_buffer = snapshot.depth.as_ref()?;
        let camera = &snapshot.camera;
        let depth = depth_buffer.lock();

        let corners = ctx.detection.corners();
        let tl = unproject_pixel(camera, &depth, corners.top_left);
        let tr = unproject_pixel(camera, &depth, corners.top_right);
        let bl = unproject_pixel(camera, &depth, corners.bottom_left);
        let br = unproject_pixel(camera, &depth, corners.bottom_right);

        let horizontal_mm = (tr - tl).norm() * METERS_TO_MM;
        let vertical_mm = (bl - tl).norm() * METERS_TO_MM;
        let diagonal_mm = (tr - bl).norm() * METERS_TO_MM;
        let bridge_mm = self.bridge_mm(camera, &depth, ctx, tl, tr, bl, br);

        let tilt_deg = ctx.detection.tilt_deg();
        let aligned = tilt_deg.abs() <= self.alignment_tolerance_deg;

        let (dp_mm, dnp_left_mm, dnp_right_mm, alt_left_mm, alt_right_mm) = match ctx.eyes {
            Some(eyes) => {
                let left = eyes.left_position();
                let right = eyes.right_position();
                let dp_mm = (right - left).norm() * METERS_TO_MM;

                // Nose reference falls back to the eye midpoint when the
                // mesh offers no bridge landmark
                let nose = ctx.nose.unwrap_or_else(|| Point3::from((left.coords + right.coords) / 2.0));
                let dnp_left_mm = (left - nose).norm() * METERS_TO_MM;
                let dnp_right_mm = (right - nose).norm() * METERS_TO_MM;

                let alt_left_mm = self.altura_mm(camera, &depth, ctx, left, bl);
                let alt_right_mm = self.altura_mm(camera, &depth, ctx, right, br);

                (dp_mm, dnp_left_mm, dnp_right_mm, alt_left_mm, alt_right_mm)
            }
            None => (0.0, 0.0, 0.0, 0.0, 0.0),
        };

        Some(MeasurementRecord {
            distance_cm: ctx.distance_m * 100.0,
            dp_mm,
            dnp_left_mm,
            dnp_right_mm,
            alt_left_mm,
            alt_right_mm,
            horizontal_mm,
            vertical_mm,
            diagonal_mm,
            bridge_mm,
            tilt_deg,
            aligned,
        })
    }

    /// Bridge width policy: for a real contour, the minimum pairwise
    /// distance between the left and right lens outlines; for a synthetic
    /// box, the gap between the top and bottom edge midpoints.
    fn bridge_mm(
        &self,
        camera: &CameraIntrinsics,
        depth: &DepthGuard<'_>,
        ctx: &MeasurementContext,
        tl: Point3<f32>,
        tr: Point3<f32>,
        bl: Point3<f32>,
        br: Point3<f32>,
    ) -> f32 {
        match &ctx.detection {
            FrameDetection::Contour(contour) => {
                let (l, r) = contour.closest_cross_pair();
                let l3 = unproject_pixel(camera, depth, l);
                let r3 = unproject_pixel(camera, depth, r);
                (r3 - l3).norm() * METERS_TO_MM
            }
            FrameDetection::Synthetic(_) => {
                let mid_top = Point3::from((tl.coords + tr.coords) / 2.0);
                let mid_bottom = Point3::from((bl.coords + br.coords) / 2.0);
                (mid_top - mid_bottom).norm() * METERS_TO_MM
            }
        }
    }

    /// Vertical distance from a pupil to the nearest frame point directly
    /// below it. Falls back to the side's bottom-most point when no
    /// contour point sits within the band under the pupil.
    fn altura_mm(
        &self,
        camera: &CameraIntrinsics,
        depth: &DepthGuard<'_>,
        ctx: &MeasurementContext,
        pupil: Point3<f32>,
        side_bottom: Point3<f32>,
    ) -> f32 {
        let below = camera
            .project(&pupil)
            .and_then(|px| ctx.detection.point_below(px.x, px.y, self.altura_band_px))
            .map(|p| unproject_pixel(camera, depth, p));

        let lower = below.unwrap_or(side_bottom);
        (lower.y - pupil.y).abs() * METERS_TO_MM
    }
}

fn unproject_pixel(camera: &CameraIntrinsics, depth: &DepthGuard<'_>, pixel: Point2<f32>) -> Point3<f32> {
    let z = depth.sample(pixel.x, pixel.y);
    camera.unproject(pixel.x, pixel.y, z)
}
