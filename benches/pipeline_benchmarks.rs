//! Benchmarks for the per-tick hot path

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use image::RgbaImage;
use nalgebra::{Point2, Point3};
use pupilometer::camera::CameraIntrinsics;
use pupilometer::config::Config;
use pupilometer::contour::ContourSource;
use pupilometer::depth::DepthBuffer;
use pupilometer::frame::{Capabilities, CameraMode, FrameSnapshot};
use pupilometer::pose::{EyePair, FacePose, PoseAnalyzer};
use pupilometer::session::CaptureSession;
use std::time::Duration;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const FOCAL: f32 = 500.0;
const DEPTH_M: f32 = 0.5;

struct BenchFrameSource;

impl ContourSource for BenchFrameSource {
    fn detect(&mut self, _image: &RgbaImage, dark_on_light: bool) -> pupilometer::Result<Vec<Point2<f32>>> {
        if !dark_on_light {
            return Ok(Vec::new());
        }
        let mut points = Vec::with_capacity(64);
        for i in 0..32 {
            let t = i as f32 / 31.0;
            points.push(Point2::new(0.4 + t * 0.2, 0.46));
            points.push(Point2::new(0.4 + t * 0.2, 0.54));
        }
        Ok(points)
    }
}

fn snapshot(timestamp: Duration) -> FrameSnapshot {
    FrameSnapshot {
        timestamp,
        camera: CameraIntrinsics::ideal(FOCAL, WIDTH, HEIGHT),
        depth: Some(
            DepthBuffer::packed(vec![DEPTH_M; (WIDTH * HEIGHT) as usize], WIDTH as usize, HEIGHT as usize)
                .expect("constant buffer is well-formed"),
        ),
        face: Some(FacePose::from_angles(Point3::new(0.0, 0.0, DEPTH_M), 0.0, 0.0)),
        eyes: Some(EyePair::looking_ahead(
            Point3::new(-0.031, 0.0, DEPTH_M),
            Point3::new(0.031, 0.0, DEPTH_M),
        )),
        nose: None,
        image: RgbaImage::new(WIDTH, HEIGHT),
    }
}

fn benchmark_pose_analysis(c: &mut Criterion) {
    let analyzer = PoseAnalyzer::new(CameraIntrinsics::ideal(FOCAL, WIDTH, HEIGHT));
    let pose = FacePose::from_angles(Point3::new(0.02, -0.01, DEPTH_M), 3.0, -2.0);

    c.bench_function("pose_analysis", |b| {
        b.iter(|| analyzer.analyze(black_box(&pose)));
    });
}

fn benchmark_depth_sampling(c: &mut Criterion) {
    let buffer = DepthBuffer::packed(vec![DEPTH_M; (WIDTH * HEIGHT) as usize], WIDTH as usize, HEIGHT as usize)
        .expect("constant buffer is well-formed");

    c.bench_function("depth_sample_locked", |b| {
        b.iter(|| {
            let depth = buffer.lock();
            black_box(depth.sample(black_box(320.0), black_box(240.0)))
        });
    });
}

fn benchmark_full_tick(c: &mut Criterion) {
    let mut session = CaptureSession::new(
        Config::default(),
        CameraMode::Front,
        Capabilities {
            face_tracking: true,
            scene_depth: true,
        },
        Box::new(BenchFrameSource),
    )
    .expect("config is valid");
    // Keep the debounce from firing mid-benchmark
    session.set_auto_capture(false);

    c.bench_function("process_frame_full_pass", |b| {
        b.iter_batched(
            || snapshot(Duration::ZERO),
            |snap| session.process_frame(snap),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    benchmark_pose_analysis,
    benchmark_depth_sampling,
    benchmark_full_tick
);
criterion_main!(benches);
