//! Capture session coordination.
//!
//! Owns the pipeline, the measurement engine, the contour detector, and the
//! auto-capture debounce, and runs them over each incoming frame snapshot.
//! Results flow back to the caller as the return value of
//! [`CaptureSession::process_frame`] — there is no shared global state and
//! no callback registry; the session is the single owner of everything that
//! outlives a tick.

use crate::capture::AutoCaptureController;
use crate::config::Config;
use crate::contour::{ContourSource, FrameContourDetector};
use crate::frame::{Capabilities, CameraMode, FrameSnapshot};
use crate::measurement::{MeasurementEngine, MeasurementRecord};
use crate::pipeline::{Cue, ValidationPipeline};
use crate::{Error, Result};
use image::RgbaImage;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// A delivered capture: the measurement record plus the camera frame it
/// was computed from.
pub struct Capture {
    /// The computed measurements
    pub record: MeasurementRecord,
    /// Snapshot image at capture time
    pub image: RgbaImage,
}

/// Everything one call to [`CaptureSession::process_frame`] reports back.
pub struct TickEvent {
    /// Count of gates passed, `0..=gate_count`
    pub progress: u8,
    /// Total number of gates
    pub gate_count: u8,
    /// First failing gate's hint, `None` on a full pass
    pub hint: Option<String>,
    /// Directional cue for the hint
    pub cue: Cue,
    /// True when every gate passed and no capture has been delivered yet
    pub can_capture: bool,
    /// The capture, on the tick the debounce fires
    pub capture: Option<Capture>,
}

/// Drives validation, measurement, and capture over a stream of frame
/// snapshots.
pub struct CaptureSession {
    pipeline: ValidationPipeline,
    engine: MeasurementEngine,
    detector: FrameContourDetector,
    controller: AutoCaptureController,
    latest: Option<Capture>,
}

impl CaptureSession {
    /// Create a session for the given camera mode.
    ///
    /// # Errors
    ///
    /// Returns `Capability` when the device cannot track faces at all —
    /// the one failure that is reported up front instead of per tick — and
    /// `ConfigError` when the configuration is invalid.
    pub fn new(
        config: Config,
        mode: CameraMode,
        capabilities: Capabilities,
        contour_source: Box<dyn ContourSource>,
    ) -> Result<Self> {
        config.validate()?;

        if !capabilities.face_tracking {
            return Err(Error::Capability(
                "Device has no face-tracking support; measurements are impossible".to_string(),
            ));
        }
        if !capabilities.scene_depth {
            // Recoverable: the depth gates fail per tick until the sensor
            // comes up
            log::warn!("Session started without scene depth; capture will stall at the depth gates");
        }

        log::info!("Starting capture session ({mode:?} camera)");

        let detector = FrameContourDetector::new(
            contour_source,
            config.contour.min_points,
            config.contour.dark_on_light,
        );
        let controller = AutoCaptureController::new(Duration::from_secs_f64(config.capture.auto_delay_secs));
        let engine = MeasurementEngine::new(&config);

        Ok(Self {
            pipeline: ValidationPipeline::new(config, mode),
            engine,
            detector,
            controller,
            latest: None,
        })
    }

    /// Shared handle to the auto-capture flag, safe to toggle from a UI
    /// thread. Changes apply from the next tick.
    #[must_use]
    pub fn auto_capture_handle(&self) -> Arc<AtomicBool> {
        self.controller.enabled_handle()
    }

    /// Enable or disable automatic capture
    pub fn set_auto_capture(&self, enabled: bool) {
        self.controller.set_auto_enabled(enabled);
    }

    /// Evaluate one frame snapshot.
    ///
    /// Runs synchronously; the snapshot is consumed and dropped with the
    /// tick. A capture appears on the event exactly once per session, when
    /// the debounce fires.
    pub fn process_frame(&mut self, snapshot: FrameSnapshot) -> TickEvent {
        let timestamp = snapshot.timestamp;
        let evaluation = self.pipeline.evaluate(&snapshot, &mut self.detector);

        let mut measured = false;
        if let Some(ctx) = &evaluation.context {
            if let Some(record) = self.engine.measure(&snapshot, ctx) {
                self.latest = Some(Capture {
                    record,
                    image: snapshot.image,
                });
                measured = true;
            }
        }

        let full_pass = evaluation.full_pass() && measured;
        let fired = self.controller.tick(full_pass, timestamp);
        let capture = if fired { self.latest.take() } else { None };

        TickEvent {
            progress: evaluation.progress,
            gate_count: self.pipeline.gate_count(),
            hint: evaluation.hint,
            cue: evaluation.cue,
            can_capture: full_pass && !self.controller.delivered(),
            capture,
        }
    }

    /// Force a capture immediately, bypassing the debounce.
    ///
    /// Delivers the most recent fully-passing measurement, or `None` when
    /// no frame has passed validation yet or a capture was already
    /// delivered. Either way a delivered capture marks the session
    /// captured, so later automatic and forced attempts are no-ops.
    pub fn force_capture(&mut self) -> Option<Capture> {
        if self.latest.is_none() {
            log::warn!("Forced capture requested before any frame passed validation");
            return None;
        }
        if !self.controller.force() {
            return None;
        }
        self.latest.take()
    }

    /// Progress reported by the most recent tick
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.pipeline.state().progress
    }
}
