//! Per-frame validation pipeline.
//!
//! An ordered sequence of gates decides whether a frame is usable for
//! measurement. Gates run cheapest-first — pose existence before angle
//! checks before the contour pass, which costs a full image sweep — and the
//! first failing gate short-circuits the tick: its hint is the tick's hint,
//! later gates are not evaluated, and progress is the number of gates that
//! passed. A full pass yields progress equal to the gate count, an empty
//! hint, and the measurement context the engine consumes.

use crate::config::Config;
use crate::constants::GATE_COUNT;
use crate::contour::{FrameBounds, FrameContourDetector, FrameDetection};
use crate::frame::{CameraMode, FrameSnapshot};
use crate::pose::{EyePair, PoseAnalyzer, PoseMetrics};
use nalgebra::Point3;

/// Directional cue accompanying a hint, rendered as an arrow by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cue {
    /// No direction applies
    #[default]
    None,
    /// Move or turn left
    Left,
    /// Move or turn right
    Right,
    /// Move or tilt up
    Up,
    /// Move or tilt down
    Down,
}

/// The ordered validity checks, cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// A face pose transform is present
    FacePresent,
    /// Face distance within the camera mode's range
    DistanceInRange,
    /// Head yaw within tolerance
    YawAligned,
    /// Head pitch within tolerance
    PitchAligned,
    /// Face centered in the viewport
    Centered,
    /// Both eyes looking at the camera (front camera only)
    GazeAligned,
    /// Eyewear frame detected
    FrameDetected,
    /// Frame bottom edge level
    FrameLevel,
}

/// Mutable pipeline state, persisted across ticks.
#[derive(Debug, Clone, Default)]
pub struct ValidationState {
    /// Count of gates passed on the last tick, `0..=GATE_COUNT`
    pub progress: u8,
    /// First failing gate's hint, empty on a full pass
    pub hint: String,
    /// Directional cue for the hint
    pub cue: Cue,
}

/// Everything a fully-passing tick hands to the measurement engine.
pub struct MeasurementContext {
    /// The frame detection, real or synthetic
    pub detection: FrameDetection,
    /// Analyzed pose values for the tick
    pub metrics: PoseMetrics,
    /// Eye transforms, absent on the rear camera
    pub eyes: Option<EyePair>,
    /// Nose-bridge landmark, when the mesh provides one
    pub nose: Option<Point3<f32>>,
    /// Validated face distance in meters (depth-sampled on the rear camera)
    pub distance_m: f32,
}

/// Result of evaluating one tick.
pub struct Evaluation {
    /// Count of gates passed, `0..=GATE_COUNT`
    pub progress: u8,
    /// The gate that halted the tick, `None` on a full pass
    pub failed_gate: Option<Gate>,
    /// First failing gate's hint, `None` on a full pass
    pub hint: Option<String>,
    /// Directional cue for the hint
    pub cue: Cue,
    /// Present exactly when every gate passed
    pub context: Option<MeasurementContext>,
}

impl Evaluation {
    fn fail(progress: u8, gate: Gate, hint: String, cue: Cue) -> Self {
        Self {
            progress,
            failed_gate: Some(gate),
            hint: Some(hint),
            cue,
            context: None,
        }
    }

    /// True when every gate passed this tick
    #[must_use]
    pub fn full_pass(&self) -> bool {
        self.context.is_some()
    }
}

/// The ordered gate state machine.
pub struct ValidationPipeline {
    config: Config,
    mode: CameraMode,
    state: ValidationState,
}

impl ValidationPipeline {
    /// Create a pipeline for the given camera mode
    #[must_use]
    pub fn new(config: Config, mode: CameraMode) -> Self {
        Self {
            config,
            mode,
            state: ValidationState::default(),
        }
    }

    /// State left by the most recent tick
    #[must_use]
    pub fn state(&self) -> &ValidationState {
        &self.state
    }

    /// Total number of gates
    #[must_use]
    pub fn gate_count(&self) -> u8 {
        GATE_COUNT
    }

    /// Evaluate one frame snapshot against the gate sequence.
    ///
    /// Runs synchronously inside the tick; the first failing gate ends the
    /// evaluation and caps the score, so the expensive contour pass only
    /// runs once everything cheaper already holds.
    pub fn evaluate(&mut self, snapshot: &FrameSnapshot, detector: &mut FrameContourDetector) -> Evaluation {
        let evaluation = self.run_gates(snapshot, detector);
        self.state.progress = evaluation.progress;
        self.state.hint = evaluation.hint.clone().unwrap_or_default();
        self.state.cue = evaluation.cue;
        evaluation
    }

    fn run_gates(&self, snapshot: &FrameSnapshot, detector: &mut FrameContourDetector) -> Evaluation {
        let mut progress = 0;

        // Gate 1: face pose present
        let Some(face) = snapshot.face.as_ref() else {
            return Evaluation::fail(
                progress,
                Gate::FacePresent,
                "Position your face in the oval".to_string(),
                Cue::None,
            );
        };
        progress += 1;

        let analyzer = PoseAnalyzer::new(snapshot.camera);
        let mut metrics = analyzer.analyze(face);

        // Gate 2: distance in range. The front camera trusts the tracked
        // pose; the rear camera samples the depth buffer at the projected
        // face origin.
        let (min_m, max_m) = match self.mode {
            CameraMode::Front => (self.config.distance.front_min_m, self.config.distance.front_max_m),
            CameraMode::Rear => (self.config.distance.rear_min_m, self.config.distance.rear_max_m),
        };
        let distance_m = match self.mode {
            CameraMode::Front => metrics.distance_m,
            CameraMode::Rear => {
                let Some(depth) = snapshot.depth.as_ref() else {
                    return Evaluation::fail(progress, Gate::DistanceInRange, "Depth unavailable".to_string(), Cue::None);
                };
                let center = snapshot.camera.viewport_center();
                let pixel = snapshot
                    .camera
                    .project(&face.position())
                    .unwrap_or(center);
                let sampled = depth.lock().sample(pixel.x, pixel.y);
                metrics.distance_m = sampled;
                sampled
            }
        };
        let distance_cm = distance_m * 100.0;
        if distance_m < min_m {
            return Evaluation::fail(
                progress,
                Gate::DistanceInRange,
                format!("Move farther away ({distance_cm:.0} cm)"),
                Cue::None,
            );
        }
        if distance_m > max_m {
            return Evaluation::fail(
                progress,
                Gate::DistanceInRange,
                format!("Move closer ({distance_cm:.0} cm)"),
                Cue::None,
            );
        }
        progress += 1;

        // Gate 3: yaw
        let yaw_abs = metrics.yaw_deg.abs().round();
        if metrics.yaw_deg.abs() > self.config.alignment.yaw_tolerance_deg {
            return if metrics.yaw_deg > 0.0 {
                Evaluation::fail(
                    progress,
                    Gate::YawAligned,
                    format!("Turn your head {yaw_abs:.0}° to the left"),
                    Cue::Left,
                )
            } else {
                Evaluation::fail(
                    progress,
                    Gate::YawAligned,
                    format!("Turn your head {yaw_abs:.0}° to the right"),
                    Cue::Right,
                )
            };
        }
        progress += 1;

        // Gate 4: pitch
        let pitch_abs = metrics.pitch_deg.abs().round();
        if metrics.pitch_deg.abs() > self.config.alignment.pitch_tolerance_deg {
            return if metrics.pitch_deg > 0.0 {
                Evaluation::fail(progress, Gate::PitchAligned, format!("Raise your chin {pitch_abs:.0}°"), Cue::Up)
            } else {
                Evaluation::fail(progress, Gate::PitchAligned, format!("Lower your chin {pitch_abs:.0}°"), Cue::Down)
            };
        }
        progress += 1;

        // Gate 5: centering, x before y
        let tol = self.config.alignment.center_tolerance_px;
        if metrics.offset_x.abs() > tol {
            return if metrics.offset_x > 0.0 {
                Evaluation::fail(progress, Gate::Centered, "Move your face to the left".to_string(), Cue::Left)
            } else {
                Evaluation::fail(progress, Gate::Centered, "Move your face to the right".to_string(), Cue::Right)
            };
        }
        if metrics.offset_y.abs() > tol {
            return if metrics.offset_y > 0.0 {
                Evaluation::fail(progress, Gate::Centered, "Lower the device".to_string(), Cue::Down)
            } else {
                Evaluation::fail(progress, Gate::Centered, "Raise the device".to_string(), Cue::Up)
            };
        }
        progress += 1;

        // Gate 6: gaze, front camera only; the rear camera has no eye
        // transforms and the gate passes vacuously
        if self.mode == CameraMode::Front {
            let aligned = snapshot
                .eyes
                .as_ref()
                .is_some_and(|eyes| eyes.gaze_within(self.config.alignment.gaze_tolerance));
            if !aligned {
                return Evaluation::fail(progress, Gate::GazeAligned, "Look at the camera".to_string(), Cue::None);
            }
        }
        progress += 1;

        // Gate 7: eyewear frame detected. Depth is also required from here
        // on — the measurement cannot unproject the corners without it.
        if snapshot.depth.is_none() {
            return Evaluation::fail(progress, Gate::FrameDetected, "Depth unavailable".to_string(), Cue::None);
        }
        let detection = match detector.detect(&snapshot.image) {
            Some(contour) => FrameDetection::Contour(contour),
            None => match self.mode {
                CameraMode::Front => {
                    return Evaluation::fail(
                        progress,
                        Gate::FrameDetected,
                        "Put on the eyewear frame or adjust it".to_string(),
                        Cue::None,
                    );
                }
                // No usable contrast against the scene; stand in a
                // nominally-sized frame centered on the tracked face
                CameraMode::Rear => {
                    let center = snapshot.camera.viewport_center();
                    let pixel = snapshot
                        .camera
                        .project(&face.position())
                        .unwrap_or(center);
                    FrameDetection::Synthetic(FrameBounds::nominal_for(pixel, distance_m, &snapshot.camera))
                }
            },
        };
        progress += 1;

        // Gate 8: frame level
        let tilt = detection.tilt_deg();
        if tilt.abs() > self.config.contour.max_tilt_deg {
            let cue = if tilt > 0.0 { Cue::Right } else { Cue::Left };
            return Evaluation::fail(
                progress,
                Gate::FrameLevel,
                format!("Frame is tilted {:.0}°", tilt.abs().round()),
                cue,
            );
        }
        progress += 1;

        debug_assert_eq!(progress, GATE_COUNT);
        Evaluation {
            progress,
            failed_gate: None,
            hint: None,
            cue: Cue::None,
            context: Some(MeasurementContext {
                detection,
                metrics,
                eyes: snapshot.eyes,
                nose: snapshot.nose,
                distance_m,
            }),
        }
    }
}
