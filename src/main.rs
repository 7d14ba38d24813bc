//! Capture session simulator.
//!
//! Replays a scripted approach sequence — a user walking into range,
//! straightening their head, and centering — through the full validation
//! and measurement pipeline, printing per-tick progress and the final
//! record. Useful for exercising gate ordering and capture timing without
//! a camera.

use anyhow::Result;
use clap::Parser;
use image::RgbaImage;
use log::info;
use nalgebra::{Point2, Point3};
use pupilometer::config::Config;
use pupilometer::contour::ContourSource;
use pupilometer::frame::{Capabilities, CameraMode, FrameSnapshot};
use pupilometer::pose::{EyePair, FacePose};
use pupilometer::session::CaptureSession;
use pupilometer::{camera::CameraIntrinsics, depth::DepthBuffer};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const IMAGE_WIDTH: u32 = 640;
const IMAGE_HEIGHT: u32 = 480;
const FOCAL_PX: f32 = 500.0;
const TICK_SECS: f64 = 1.0 / 30.0;

/// Simulated eyewear frame: 130 mm front, 40 mm lenses
const FRAME_WIDTH_M: f32 = 0.130;
const FRAME_HEIGHT_M: f32 = 0.040;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Simulate the rear camera profile
    #[arg(long)]
    rear: bool,

    /// Auto-capture delay override in seconds
    #[arg(long)]
    auto_delay: Option<f64>,

    /// Maximum number of simulated ticks
    #[arg(short, long, default_value = "300")]
    ticks: u32,

    /// Starting face distance in meters
    #[arg(long, default_value = "1.0")]
    start_distance: f32,

    /// Disable auto-capture and force a capture at the end instead
    #[arg(long)]
    no_auto: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

/// Scripted state shared between the tick loop and the contour source
struct SimScript {
    distance_m: f32,
    frame_worn: bool,
}

/// Contour source that outlines the simulated frame at the scripted
/// distance
struct ScriptedContours {
    script: Arc<Mutex<SimScript>>,
}

impl ContourSource for ScriptedContours {
    fn detect(&mut self, _image: &RgbaImage, dark_on_light: bool) -> pupilometer::Result<Vec<Point2<f32>>> {
        if !dark_on_light {
            return Ok(Vec::new());
        }
        let script = self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !script.frame_worn {
            return Ok(Vec::new());
        }

        // Normalized outline of the frame as projected at the scripted
        // distance, y up
        let half_w = FRAME_WIDTH_M / 2.0 * FOCAL_PX / script.distance_m / IMAGE_WIDTH as f32;
        let half_h = FRAME_HEIGHT_M / 2.0 * FOCAL_PX / script.distance_m / IMAGE_HEIGHT as f32;
        let mut points = Vec::new();
        for i in 0..12 {
            let t = i as f32 / 11.0;
            let x = 0.5 - half_w + t * 2.0 * half_w;
            points.push(Point2::new(x, 0.5 - half_h));
            points.push(Point2::new(x, 0.5 + half_h));
        }
        Ok(points)
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Scripted pose path: approach during the first two seconds, straighten
/// the head during the next, then hold steady
fn scripted_snapshot(tick: u32, start_distance: f32, target_distance: f32) -> FrameSnapshot {
    let camera = CameraIntrinsics::ideal(FOCAL_PX, IMAGE_WIDTH, IMAGE_HEIGHT);

    let distance = lerp(start_distance, target_distance, tick as f32 / 60.0);
    let yaw = lerp(8.0, 0.0, (tick as f32 - 60.0) / 30.0);
    let offset_x = lerp(0.08, 0.0, (tick as f32 - 90.0) / 30.0);

    let face = FacePose::from_angles(Point3::new(offset_x, 0.0, distance), yaw, 0.0);
    let eyes = EyePair::looking_ahead(
        Point3::new(offset_x - 0.031, -0.005, distance - 0.02),
        Point3::new(offset_x + 0.031, -0.005, distance - 0.02),
    );
    let depth = DepthBuffer::packed(
        vec![distance; (IMAGE_WIDTH * IMAGE_HEIGHT) as usize],
        IMAGE_WIDTH as usize,
        IMAGE_HEIGHT as usize,
    )
    .expect("constant depth buffer is always well-formed");

    FrameSnapshot {
        timestamp: Duration::from_secs_f64(f64::from(tick) * TICK_SECS),
        camera,
        depth: Some(depth),
        face: Some(face),
        eyes: Some(eyes),
        nose: None,
        image: RgbaImage::new(IMAGE_WIDTH, IMAGE_HEIGHT),
    }
}

fn print_record(record: &pupilometer::measurement::MeasurementRecord) {
    println!("Captured at {:.0} cm:", record.distance_cm);
    println!("  DP        {:>6.1} mm", record.dp_mm);
    println!("  DNP L/R   {:>6.1} / {:.1} mm", record.dnp_left_mm, record.dnp_right_mm);
    println!("  ALT L/R   {:>6.1} / {:.1} mm", record.alt_left_mm, record.alt_right_mm);
    println!("  Frame     {:>6.1} × {:.1} mm (diag {:.1})", record.horizontal_mm, record.vertical_mm, record.diagonal_mm);
    println!("  Bridge    {:>6.1} mm", record.bridge_mm);
    println!("  Tilt      {:>6.2}° (aligned: {})", record.tilt_deg, record.aligned);
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(delay) = args.auto_delay {
        config.capture.auto_delay_secs = delay;
    }

    let mode = if args.rear { CameraMode::Rear } else { CameraMode::Front };
    let script = Arc::new(Mutex::new(SimScript {
        distance_m: args.start_distance,
        frame_worn: true,
    }));
    let source = ScriptedContours {
        script: Arc::clone(&script),
    };

    let capabilities = Capabilities {
        face_tracking: true,
        scene_depth: true,
    };
    let mut session = CaptureSession::new(config, mode, capabilities, Box::new(source))?;
    if args.no_auto {
        session.set_auto_capture(false);
    }

    // Settle inside the selected camera's accepted range
    let target_distance = if args.rear { 0.9 } else { 0.5 };

    info!("Simulating {} ticks from {:.2} m", args.ticks, args.start_distance);

    let mut last_line = String::new();
    for tick in 0..args.ticks {
        let snapshot = scripted_snapshot(tick, args.start_distance, target_distance);
        {
            let mut s = script.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            s.distance_m = snapshot.face.as_ref().map_or(args.start_distance, |f| f.position().z);
        }

        let event = session.process_frame(snapshot);
        let line = format!(
            "{}/{} {}",
            event.progress,
            event.gate_count,
            event.hint.as_deref().unwrap_or("ready")
        );
        if line != last_line {
            println!("[{:>5.2}s] {line}", f64::from(tick) * TICK_SECS);
            last_line = line;
        }

        if let Some(capture) = event.capture {
            print_record(&capture.record);
            return Ok(());
        }
    }

    if args.no_auto {
        match session.force_capture() {
            Some(capture) => {
                print_record(&capture.record);
                return Ok(());
            }
            None => println!("No validated frame to capture"),
        }
    }

    println!("No capture after {} ticks", args.ticks);
    Ok(())
}
