//! Eyewear-frame contour detection.
//!
//! The raw edge/contour extraction runs in an external vision collaborator
//! behind the [`ContourSource`] trait; this module owns everything after it:
//! the polarity retry, the conversion from normalized detector coordinates
//! into pixel space, the left/right partition, and the extremal points the
//! level gate and the measurement engine consume.

use crate::camera::CameraIntrinsics;
use crate::constants::{NOMINAL_FRAME_HEIGHT_MM, NOMINAL_FRAME_WIDTH_MM};
use crate::Result;
use image::RgbaImage;
use nalgebra::{Point2, Point3};

/// External contour/edge extractor.
///
/// Returns candidate contour points in the detector's normalized
/// coordinates: both axes in `[0, 1]`, y growing upward. An empty result
/// means no contour was found under the given polarity assumption — a
/// normal, retryable condition.
pub trait ContourSource {
    /// Extract contour points from a camera image.
    ///
    /// # Errors
    ///
    /// Returns an error only when the collaborator itself fails, not when
    /// no contour is present.
    fn detect(&mut self, image: &RgbaImage, dark_on_light: bool) -> Result<Vec<Point2<f32>>>;
}

/// The four bounding corners of a detected frame, in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCorners {
    /// Top-left bounding corner
    pub top_left: Point2<f32>,
    /// Top-right bounding corner
    pub top_right: Point2<f32>,
    /// Bottom-left bounding corner
    pub bottom_left: Point2<f32>,
    /// Bottom-right bounding corner
    pub bottom_right: Point2<f32>,
}

/// An axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBounds {
    /// Minimum x/y corner
    pub min: Point2<f32>,
    /// Maximum x/y corner
    pub max: Point2<f32>,
}

impl FrameBounds {
    /// Bounds for a nominally-sized frame centered on a face at a known
    /// distance. Used by the rear-camera path when no contour is
    /// detectable against the scene.
    #[must_use]
    pub fn nominal_for(center_px: Point2<f32>, distance_m: f32, camera: &CameraIntrinsics) -> Self {
        let half_w = NOMINAL_FRAME_WIDTH_MM / 2000.0;
        let half_h = NOMINAL_FRAME_HEIGHT_MM / 2000.0;
        let center = camera.unproject(center_px.x, center_px.y, distance_m);
        let min3 = Point3::new(center.x - half_w, center.y - half_h, distance_m);
        let max3 = Point3::new(center.x + half_w, center.y + half_h, distance_m);
        // At distance_m > 0 both projections exist
        let min = camera.project(&min3).unwrap_or(center_px);
        let max = camera.project(&max3).unwrap_or(center_px);
        Self { min, max }
    }

    fn corners(&self) -> FrameCorners {
        FrameCorners {
            top_left: Point2::new(self.min.x, self.min.y),
            top_right: Point2::new(self.max.x, self.min.y),
            bottom_left: Point2::new(self.min.x, self.max.y),
            bottom_right: Point2::new(self.max.x, self.max.y),
        }
    }
}

/// Filtered contour points in pixel coordinates, partitioned into left and
/// right halves at the horizontal midpoint of the image.
#[derive(Debug, Clone)]
pub struct FrameContour {
    left: Vec<Point2<f32>>,
    right: Vec<Point2<f32>>,
    bounds: FrameBounds,
}

impl FrameContour {
    /// Partition pixel-space contour points at the image midpoint.
    ///
    /// Returns `None` when either half ends up empty — a one-sided point
    /// set has no usable frame geometry.
    #[must_use]
    pub fn from_pixel_points(points: &[Point2<f32>], image_width: u32) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mid_x = image_width as f32 / 2.0;
        let (left, right): (Vec<_>, Vec<_>) = points.iter().copied().partition(|p| p.x < mid_x);
        if left.is_empty() || right.is_empty() {
            return None;
        }

        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Some(Self {
            left,
            right,
            bounds: FrameBounds { min, max },
        })
    }

    /// Total number of contour points
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.left.len() + self.right.len()
    }

    /// Bottom-most contour point of each half, left then right.
    ///
    /// Pixel y grows downward, so "bottom-most" is the maximum y.
    #[must_use]
    pub fn bottom_points(&self) -> (Point2<f32>, Point2<f32>) {
        let lowest = |half: &[Point2<f32>]| {
            half.iter()
                .copied()
                .max_by(|a, b| a.y.total_cmp(&b.y))
                .unwrap_or_else(|| Point2::new(0.0, 0.0))
        };
        (lowest(&self.left), lowest(&self.right))
    }

    /// The left/right point pair with the smallest pixel separation.
    ///
    /// This is the bridge gap of the frame: the closest approach between
    /// the two lens outlines.
    #[must_use]
    pub fn closest_cross_pair(&self) -> (Point2<f32>, Point2<f32>) {
        let mut best = (self.left[0], self.right[0]);
        let mut best_sq = f32::INFINITY;
        for l in &self.left {
            for r in &self.right {
                let d = (r - l).norm_squared();
                if d < best_sq {
                    best_sq = d;
                    best = (*l, *r);
                }
            }
        }
        best
    }

    /// Nearest contour point directly below `(x, y)` within a horizontal
    /// band, or `None` when nothing of the frame sits under that pixel.
    #[must_use]
    pub fn point_below(&self, x: f32, y: f32, band_px: f32) -> Option<Point2<f32>> {
        self.left
            .iter()
            .chain(self.right.iter())
            .filter(|p| (p.x - x).abs() <= band_px && p.y > y)
            .copied()
            .min_by(|a, b| a.y.total_cmp(&b.y))
    }
}

/// A usable eyewear-frame detection for one tick.
///
/// The synthetic variant carries the same bounding geometry as a real
/// contour and stands in for it on the rear-camera path, where the scene
/// rarely offers enough contrast for edge extraction.
#[derive(Debug, Clone)]
pub enum FrameDetection {
    /// Frame geometry extracted from a real contour
    Contour(FrameContour),
    /// Fallback geometry derived from the tracked face
    Synthetic(FrameBounds),
}

impl FrameDetection {
    /// Bounding corners in pixel coordinates
    #[must_use]
    pub fn corners(&self) -> FrameCorners {
        match self {
            Self::Contour(contour) => contour.bounds.corners(),
            Self::Synthetic(bounds) => bounds.corners(),
        }
    }

    /// Bottom-most point of each half, left then right
    #[must_use]
    pub fn bottom_points(&self) -> (Point2<f32>, Point2<f32>) {
        match self {
            Self::Contour(contour) => contour.bottom_points(),
            Self::Synthetic(bounds) => {
                let c = bounds.corners();
                (c.bottom_left, c.bottom_right)
            }
        }
    }

    /// Signed tilt of the frame's bottom edge in degrees.
    ///
    /// Zero means level; the sign follows pixel space, positive when the
    /// right side sits lower than the left.
    #[must_use]
    pub fn tilt_deg(&self) -> f32 {
        let (l, r) = self.bottom_points();
        (r.y - l.y).atan2(r.x - l.x).to_degrees()
    }

    /// Nearest frame point directly below `(x, y)` within a horizontal
    /// band. The synthetic variant answers with its bottom edge.
    #[must_use]
    pub fn point_below(&self, x: f32, y: f32, band_px: f32) -> Option<Point2<f32>> {
        match self {
            Self::Contour(contour) => contour.point_below(x, y, band_px),
            Self::Synthetic(bounds) => {
                if x >= bounds.min.x - band_px && x <= bounds.max.x + band_px && bounds.max.y > y {
                    Some(Point2::new(x.clamp(bounds.min.x, bounds.max.x), bounds.max.y))
                } else {
                    None
                }
            }
        }
    }
}

/// Filters raw detector output into usable frame geometry.
pub struct FrameContourDetector {
    source: Box<dyn ContourSource>,
    min_points: usize,
    dark_on_light: bool,
}

impl FrameContourDetector {
    /// Create a detector around an external contour source
    #[must_use]
    pub fn new(source: Box<dyn ContourSource>, min_points: usize, dark_on_light: bool) -> Self {
        Self {
            source,
            min_points,
            dark_on_light,
        }
    }

    /// Detect the eyewear frame in a camera image.
    ///
    /// Runs the source under the primary polarity assumption and retries
    /// once with the polarity inverted when too few points come back.
    /// `None` means no frame is detectable this tick — the user is not
    /// wearing eyewear or the contrast is inadequate — which the pipeline
    /// treats as a failing gate, not an error.
    pub fn detect(&mut self, image: &RgbaImage) -> Option<FrameContour> {
        let primary = self.run_source(image, self.dark_on_light);
        let points = if primary.len() >= self.min_points {
            primary
        } else {
            let inverted = self.run_source(image, !self.dark_on_light);
            if inverted.len() >= self.min_points {
                log::debug!("Contour found after polarity inversion ({} points)", inverted.len());
                inverted
            } else {
                return None;
            }
        };

        let (w, h) = (image.width(), image.height());
        let pixel_points: Vec<Point2<f32>> = points
            .iter()
            .map(|p| Point2::new(p.x * w as f32, (1.0 - p.y) * h as f32))
            .collect();

        FrameContour::from_pixel_points(&pixel_points, w)
    }

    fn run_source(&mut self, image: &RgbaImage, dark_on_light: bool) -> Vec<Point2<f32>> {
        match self.source.detect(image, dark_on_light) {
            Ok(points) => points,
            Err(e) => {
                log::warn!("Contour source failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct FixedSource {
        primary: Vec<Point2<f32>>,
        inverted: Vec<Point2<f32>>,
    }

    impl ContourSource for FixedSource {
        fn detect(&mut self, _image: &RgbaImage, dark_on_light: bool) -> Result<Vec<Point2<f32>>> {
            Ok(if dark_on_light {
                self.primary.clone()
            } else {
                self.inverted.clone()
            })
        }
    }

    /// Normalized rectangle outline, y up, centered in the image
    fn rect_outline(n_per_edge: usize) -> Vec<Point2<f32>> {
        let (x0, x1, y0, y1) = (0.3f32, 0.7f32, 0.4f32, 0.6f32);
        let mut pts = Vec::new();
        for i in 0..n_per_edge {
            let t = i as f32 / (n_per_edge - 1) as f32;
            pts.push(Point2::new(x0 + t * (x1 - x0), y0));
            pts.push(Point2::new(x0 + t * (x1 - x0), y1));
            pts.push(Point2::new(x0, y0 + t * (y1 - y0)));
            pts.push(Point2::new(x1, y0 + t * (y1 - y0)));
        }
        pts
    }

    fn blank_image() -> RgbaImage {
        RgbaImage::new(100, 100)
    }

    #[test]
    fn test_detects_with_primary_polarity() {
        let source = FixedSource {
            primary: rect_outline(5),
            inverted: Vec::new(),
        };
        let mut detector = FrameContourDetector::new(Box::new(source), 10, true);
        let contour = detector.detect(&blank_image()).unwrap();
        assert!(contour.point_count() >= 10);
    }

    #[test]
    fn test_polarity_retry() {
        let source = FixedSource {
            primary: Vec::new(),
            inverted: rect_outline(5),
        };
        let mut detector = FrameContourDetector::new(Box::new(source), 10, true);
        assert!(detector.detect(&blank_image()).is_some());
    }

    #[test]
    fn test_too_few_points_is_none() {
        let source = FixedSource {
            primary: rect_outline(2),
            inverted: Vec::new(),
        };
        let mut detector = FrameContourDetector::new(Box::new(source), 10, true);
        assert!(detector.detect(&blank_image()).is_none());
    }

    #[test]
    fn test_normalized_to_pixel_flips_y() {
        // A single normalized point near the top (y = 0.9) must land near
        // pixel row 10 in a 100-row image
        let pts = vec![Point2::new(0.2, 0.9)];
        let px = Point2::new(pts[0].x * 100.0, (1.0 - pts[0].y) * 100.0);
        assert_relative_eq!(px.y, 10.0, epsilon = 1e-4);
    }

    #[test]
    fn test_partition_and_corners() {
        let points: Vec<Point2<f32>> = vec![
            Point2::new(20.0, 40.0),
            Point2::new(20.0, 60.0),
            Point2::new(80.0, 40.0),
            Point2::new(80.0, 62.0),
        ];
        let contour = FrameContour::from_pixel_points(&points, 100).unwrap();
        let corners = FrameDetection::Contour(contour.clone()).corners();
        assert_relative_eq!(corners.top_left.x, 20.0);
        assert_relative_eq!(corners.top_left.y, 40.0);
        assert_relative_eq!(corners.bottom_right.x, 80.0);
        assert_relative_eq!(corners.bottom_right.y, 62.0);

        let (bl, br) = contour.bottom_points();
        assert_relative_eq!(bl.y, 60.0);
        assert_relative_eq!(br.y, 62.0);
    }

    #[test]
    fn test_one_sided_points_rejected() {
        let points: Vec<Point2<f32>> = vec![Point2::new(10.0, 40.0), Point2::new(30.0, 60.0)];
        assert!(FrameContour::from_pixel_points(&points, 100).is_none());
    }

    #[test]
    fn test_closest_cross_pair() {
        let points: Vec<Point2<f32>> = vec![
            Point2::new(10.0, 50.0),
            Point2::new(45.0, 50.0),
            Point2::new(55.0, 50.0),
            Point2::new(90.0, 50.0),
        ];
        let contour = FrameContour::from_pixel_points(&points, 100).unwrap();
        let (l, r) = contour.closest_cross_pair();
        assert_relative_eq!(l.x, 45.0);
        assert_relative_eq!(r.x, 55.0);
    }

    #[test]
    fn test_point_below_band() {
        let points: Vec<Point2<f32>> = vec![
            Point2::new(30.0, 70.0),
            Point2::new(31.0, 80.0),
            Point2::new(60.0, 75.0),
            Point2::new(90.0, 20.0),
        ];
        let contour = FrameContour::from_pixel_points(&points, 100).unwrap();
        // Nearest below (30, 50) within ±4 px is the point at y = 70
        let below = contour.point_below(30.0, 50.0, 4.0).unwrap();
        assert_relative_eq!(below.y, 70.0);
        // Nothing below in the band far from any point
        assert!(contour.point_below(5.0, 50.0, 4.0).is_none());
    }

    #[test]
    fn test_synthetic_detection_geometry() {
        let camera = CameraIntrinsics::ideal(500.0, 640, 480);
        let bounds = FrameBounds::nominal_for(Point2::new(320.0, 240.0), 0.65, &camera);
        let detection = FrameDetection::Synthetic(bounds);
        assert_relative_eq!(detection.tilt_deg(), 0.0, epsilon = 1e-6);

        let corners = detection.corners();
        assert!(corners.top_right.x > corners.top_left.x);
        assert!(corners.bottom_left.y > corners.top_left.y);

        // 130 mm at 0.65 m with fx = 500 spans 100 px
        assert_relative_eq!(corners.top_right.x - corners.top_left.x, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_synthetic_point_below() {
        let bounds = FrameBounds {
            min: Point2::new(20.0, 40.0),
            max: Point2::new(80.0, 60.0),
        };
        let detection = FrameDetection::Synthetic(bounds);
        let below = detection.point_below(50.0, 45.0, 4.0).unwrap();
        assert_relative_eq!(below.y, 60.0);
        assert!(detection.point_below(50.0, 70.0, 4.0).is_none());
    }
}
