//! Depth buffer access and sampling.
//!
//! The capture device delivers one depth buffer per tick: a row-major grid
//! of `f32` meters whose row stride may exceed the width because of
//! alignment padding. Reads must happen inside a scoped lock, mirroring the
//! lock/unlock protocol of the underlying sensor buffer; the guard is
//! released before the tick ends and is never held across a suspension
//! point.

use crate::{Error, Result};
use std::sync::{Mutex, MutexGuard};

/// Row-major depth grid in meters, possibly padded per row.
#[derive(Debug)]
struct DepthData {
    samples: Vec<f32>,
    width: usize,
    height: usize,
    /// Row stride in samples, `>= width`
    stride: usize,
}

/// A per-tick depth buffer behind a scoped lock.
#[derive(Debug)]
pub struct DepthBuffer {
    inner: Mutex<DepthData>,
}

impl DepthBuffer {
    /// Wrap a raw depth grid.
    ///
    /// # Errors
    ///
    /// Returns a `DepthBuffer` error if the dimensions are zero, the stride
    /// is smaller than the width, or the sample count does not match
    /// `stride * height`.
    pub fn new(samples: Vec<f32>, width: usize, height: usize, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::DepthBuffer("Depth buffer dimensions must be non-zero".to_string()));
        }
        if stride < width {
            return Err(Error::DepthBuffer(format!(
                "Row stride {stride} is smaller than width {width}"
            )));
        }
        if samples.len() != stride * height {
            return Err(Error::DepthBuffer(format!(
                "Expected {} samples ({} stride × {} rows), got {}",
                stride * height,
                stride,
                height,
                samples.len()
            )));
        }

        Ok(Self {
            inner: Mutex::new(DepthData {
                samples,
                width,
                height,
                stride,
            }),
        })
    }

    /// Wrap a tightly-packed depth grid (stride equals width).
    ///
    /// # Errors
    ///
    /// Same conditions as [`DepthBuffer::new`].
    pub fn packed(samples: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        Self::new(samples, width, height, width)
    }

    /// Lock the buffer for the duration of a read region.
    ///
    /// The returned guard unlocks on drop; keep its scope inside the tick.
    #[must_use]
    pub fn lock(&self) -> DepthGuard<'_> {
        // A poisoned lock only means a panic elsewhere mid-read; the data
        // itself is never left partially written.
        let data = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        DepthGuard { data }
    }
}

/// Scoped read access to a locked depth buffer.
pub struct DepthGuard<'a> {
    data: MutexGuard<'a, DepthData>,
}

impl DepthGuard<'_> {
    /// Buffer width in samples
    #[must_use]
    pub fn width(&self) -> usize {
        self.data.width
    }

    /// Buffer height in rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.data.height
    }

    /// Sample the metric depth at a pixel coordinate.
    ///
    /// Coordinates are clamped to the buffer bounds, never rejected, so
    /// this always yields a value from the grid.
    #[must_use]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let xi = (x.max(0.0) as usize).min(self.data.width - 1);
        let yi = (y.max(0.0) as usize).min(self.data.height - 1);
        self.data.samples[yi * self.data.stride + xi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient_buffer() -> DepthBuffer {
        // 4×3 grid with stride 6; value encodes row*10 + column
        let mut samples = vec![0.0f32; 6 * 3];
        for y in 0..3 {
            for x in 0..4 {
                samples[y * 6 + x] = (y * 10 + x) as f32;
            }
        }
        DepthBuffer::new(samples, 4, 3, 6).unwrap()
    }

    #[test]
    fn test_sample_respects_stride() {
        let buffer = gradient_buffer();
        let depth = buffer.lock();
        assert_relative_eq!(depth.sample(3.0, 2.0), 23.0);
        assert_relative_eq!(depth.sample(0.0, 1.0), 10.0);
    }

    #[test]
    fn test_sample_clamps_out_of_bounds() {
        let buffer = gradient_buffer();
        let depth = buffer.lock();
        assert_relative_eq!(depth.sample(-5.0, -5.0), 0.0);
        assert_relative_eq!(depth.sample(100.0, 100.0), 23.0);
    }

    #[test]
    fn test_rejects_bad_stride() {
        assert!(DepthBuffer::new(vec![0.0; 12], 4, 3, 3).is_err());
    }

    #[test]
    fn test_rejects_sample_count_mismatch() {
        assert!(DepthBuffer::new(vec![0.0; 10], 4, 3, 6).is_err());
        assert!(DepthBuffer::packed(vec![0.0; 11], 4, 3).is_err());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(DepthBuffer::packed(vec![], 0, 3).is_err());
        assert!(DepthBuffer::packed(vec![], 4, 0).is_err());
    }

    #[test]
    fn test_constant_buffer() {
        let buffer = DepthBuffer::packed(vec![0.5; 640 * 480], 640, 480).unwrap();
        let depth = buffer.lock();
        assert_relative_eq!(depth.sample(320.0, 240.0), 0.5);
    }
}
