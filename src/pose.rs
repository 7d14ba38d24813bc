//! Head pose analysis.
//!
//! Extracts the quantities the validation gates consume — distance from the
//! camera, yaw, pitch, and screen-space centering offset — from a face pose
//! transform. Analysis never fails; deciding whether the values are
//! acceptable is the pipeline's job.

use crate::camera::CameraIntrinsics;
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

/// A face pose relative to the capture device.
///
/// Column-major 4×4 rigid transform in camera space: columns 0..2 are the
/// rotated basis vectors, column 3 the translation in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePose {
    transform: Matrix4<f32>,
}

impl FacePose {
    /// Wrap a raw pose transform
    #[must_use]
    pub fn new(transform: Matrix4<f32>) -> Self {
        Self { transform }
    }

    /// Build a pose from a position and head angles.
    ///
    /// The resulting pose analyzes back to exactly the given yaw and pitch,
    /// which makes it the natural constructor for simulated frames.
    #[must_use]
    pub fn from_angles(position: Point3<f32>, yaw_deg: f32, pitch_deg: f32) -> Self {
        let yaw = -yaw_deg.to_radians();
        let pitch = pitch_deg.to_radians();
        let rotation = Rotation3::from_euler_angles(0.0, yaw, 0.0) * Rotation3::from_euler_angles(pitch, 0.0, 0.0);
        let mut transform = rotation.to_homogeneous();
        transform[(0, 3)] = position.x;
        transform[(1, 3)] = position.y;
        transform[(2, 3)] = position.z;
        Self { transform }
    }

    /// Pose origin in camera space (meters)
    #[must_use]
    pub fn position(&self) -> Point3<f32> {
        Point3::new(self.transform[(0, 3)], self.transform[(1, 3)], self.transform[(2, 3)])
    }

    /// The underlying transform
    #[must_use]
    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }
}

/// Left and right eye transforms from the face tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyePair {
    left: Matrix4<f32>,
    right: Matrix4<f32>,
}

impl EyePair {
    /// Wrap raw eye transforms
    #[must_use]
    pub fn new(left: Matrix4<f32>, right: Matrix4<f32>) -> Self {
        Self { left, right }
    }

    /// Eyes at the given positions looking straight at the camera
    #[must_use]
    pub fn looking_ahead(left: Point3<f32>, right: Point3<f32>) -> Self {
        let mut l = Matrix4::identity();
        l[(0, 3)] = left.x;
        l[(1, 3)] = left.y;
        l[(2, 3)] = left.z;
        let mut r = Matrix4::identity();
        r[(0, 3)] = right.x;
        r[(1, 3)] = right.y;
        r[(2, 3)] = right.z;
        Self { left: l, right: r }
    }

    /// Left eye center in camera space (meters)
    #[must_use]
    pub fn left_position(&self) -> Point3<f32> {
        Point3::new(self.left[(0, 3)], self.left[(1, 3)], self.left[(2, 3)])
    }

    /// Right eye center in camera space (meters)
    #[must_use]
    pub fn right_position(&self) -> Point3<f32> {
        Point3::new(self.right[(0, 3)], self.right[(1, 3)], self.right[(2, 3)])
    }

    /// Gaze direction of the left eye (negated z basis)
    #[must_use]
    pub fn left_gaze(&self) -> Vector3<f32> {
        -Vector3::new(self.left[(0, 2)], self.left[(1, 2)], self.left[(2, 2)])
    }

    /// Gaze direction of the right eye (negated z basis)
    #[must_use]
    pub fn right_gaze(&self) -> Vector3<f32> {
        -Vector3::new(self.right[(0, 2)], self.right[(1, 2)], self.right[(2, 2)])
    }

    /// True when both gaze directions point at the camera within the
    /// tolerance, checked component-wise on the horizontal and vertical
    /// axes.
    #[must_use]
    pub fn gaze_within(&self, tolerance: f32) -> bool {
        let l = self.left_gaze();
        let r = self.right_gaze();
        l.x.abs() <= tolerance && l.y.abs() <= tolerance && r.x.abs() <= tolerance && r.y.abs() <= tolerance
    }
}

/// Values the validation gates consume, one set per analyzed pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseMetrics {
    /// Distance from the camera along the optical axis (meters)
    pub distance_m: f32,
    /// Head rotation about the vertical axis (degrees)
    pub yaw_deg: f32,
    /// Head rotation about the lateral axis (degrees)
    pub pitch_deg: f32,
    /// Screen-space offset of the pose origin from the viewport center,
    /// horizontal (pixels)
    pub offset_x: f32,
    /// Screen-space offset of the pose origin from the viewport center,
    /// vertical (pixels)
    pub offset_y: f32,
}

/// Extracts gate inputs from face pose transforms.
pub struct PoseAnalyzer {
    camera: CameraIntrinsics,
}

impl PoseAnalyzer {
    /// Create an analyzer for the given camera
    #[must_use]
    pub fn new(camera: CameraIntrinsics) -> Self {
        Self { camera }
    }

    /// Analyze a face pose.
    ///
    /// Distance is the absolute z translation — the camera-aligned
    /// convention, so a face dead ahead measures the same as its depth
    /// sample. Yaw and pitch come from `atan2` over the rotated basis
    /// vectors. The centering offset is the projected pose origin relative
    /// to the viewport center; it is zero when the origin has no valid
    /// projection (at or behind the camera plane).
    #[must_use]
    pub fn analyze(&self, pose: &FacePose) -> PoseMetrics {
        let m = pose.transform();
        let position = pose.position();

        let yaw = m[(2, 0)].atan2(m[(0, 0)]);
        let pitch = m[(2, 1)].atan2(m[(2, 2)]);

        let center = self.camera.viewport_center();
        let (offset_x, offset_y) = match self.camera.project(&position) {
            Some(projected) => (projected.x - center.x, projected.y - center.y),
            None => (0.0, 0.0),
        };

        PoseMetrics {
            distance_m: position.z.abs(),
            yaw_deg: yaw.to_degrees(),
            pitch_deg: pitch.to_degrees(),
            offset_x,
            offset_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn analyzer() -> PoseAnalyzer {
        PoseAnalyzer::new(CameraIntrinsics::ideal(500.0, 640, 480))
    }

    #[test]
    fn test_identity_pose_is_neutral() {
        let pose = FacePose::from_angles(Point3::new(0.0, 0.0, 0.5), 0.0, 0.0);
        let metrics = analyzer().analyze(&pose);
        assert_relative_eq!(metrics.yaw_deg, 0.0, epsilon = 1e-4);
        assert_relative_eq!(metrics.pitch_deg, 0.0, epsilon = 1e-4);
        assert_relative_eq!(metrics.distance_m, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_angles_round_trip() {
        for &(yaw, pitch) in &[(5.0f32, 0.0f32), (-8.0, 0.0), (0.0, 4.0), (0.0, -6.0), (3.0, -2.0)] {
            let pose = FacePose::from_angles(Point3::new(0.0, 0.0, 0.5), yaw, pitch);
            let metrics = analyzer().analyze(&pose);
            assert_relative_eq!(metrics.yaw_deg, yaw, epsilon = 1e-3);
            assert_relative_eq!(metrics.pitch_deg, pitch, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_centered_pose_has_zero_offset() {
        let pose = FacePose::from_angles(Point3::new(0.0, 0.0, 0.5), 0.0, 0.0);
        let metrics = analyzer().analyze(&pose);
        assert_relative_eq!(metrics.offset_x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(metrics.offset_y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_lateral_translation_shows_as_offset() {
        // 0.05 m to the right at 0.5 m with fx = 500 projects 50 px off center
        let pose = FacePose::from_angles(Point3::new(0.05, 0.0, 0.5), 0.0, 0.0);
        let metrics = analyzer().analyze(&pose);
        assert_relative_eq!(metrics.offset_x, 50.0, epsilon = 1e-3);
        assert_relative_eq!(metrics.offset_y, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_distance_uses_z_component() {
        let pose = FacePose::from_angles(Point3::new(0.3, 0.2, 0.5), 0.0, 0.0);
        let metrics = analyzer().analyze(&pose);
        assert_relative_eq!(metrics.distance_m, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_eye_pair_positions_and_gaze() {
        let eyes = EyePair::looking_ahead(Point3::new(-0.031, 0.0, 0.5), Point3::new(0.031, 0.0, 0.5));
        assert_relative_eq!((eyes.right_position() - eyes.left_position()).norm(), 0.062, epsilon = 1e-6);
        assert!(eyes.gaze_within(0.1));
    }

    #[test]
    fn test_averted_gaze_detected() {
        // Rotate the left eye 15° about the vertical axis
        let left = Rotation3::from_euler_angles(0.0, 15.0f32.to_radians(), 0.0).to_homogeneous();
        let eyes = EyePair::new(left, Matrix4::identity());
        assert!(!eyes.gaze_within(0.1));
    }
}
