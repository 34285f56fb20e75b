//! Odometry Scenario Tests
//!
//! Synthetic scan sequences fed through the full estimator:
//! - Straight-line translation accumulates to the travelled distance
//! - A lone scan leaves the pose at its initial belief
//! - A stationary sensor does not drift
//! - Rotation in place, a full turn across the ±180° seam, combined motion
//! - JSON-lines polar replay through the pipeline
//!
//! ## Accuracy Targets
//!
//! | Scenario             | Position Error | Heading Error |
//! |----------------------|----------------|---------------|
//! | Straight 0.5m        | < 2cm          | < 0.5°        |
//! | Rotation 15°         | < 3cm drift    | < 1°          |
//! | Full turn 360°       | < 3cm drift    | < 3°          |
//! | Polar replay 0.3m    | < 5cm          | < 1°          |
//!
//! Run with: `cargo test --test odometry_scenarios`

use std::io::Write;
use std::sync::atomic::AtomicBool;

use approx::assert_relative_eq;
use gati::algorithms::matching::test_utils::{create_room, observe};
use gati::core::math::degrees_diff;
use gati::{
    JsonLinesSink, LaserScan, OdometryConfig, OdometryEstimator, OdometryPipeline,
    PointCloud2D, PoseBelief, RecordedFrame, RecordedSource, RigidTransform2D, StopReason,
    Timestamped, UpdatePhase,
};

// ============================================================================
// Fixtures
// ============================================================================

/// 4m × 3m room centred on the origin.
fn world() -> PointCloud2D {
    create_room(400, 4.0, 3.0).transform(&RigidTransform2D::translation(-2.0, -1.5))
}

fn scan_at(
    world: &PointCloud2D,
    x: f32,
    y: f32,
    theta_deg: f32,
    t: u64,
) -> Timestamped<PointCloud2D> {
    Timestamped::new(observe(world, x, y, theta_deg.to_radians()), t)
}

fn estimator() -> OdometryEstimator {
    OdometryEstimator::new(OdometryConfig::default()).unwrap()
}

/// Ray-cast a 360-beam sweep inside the box x ∈ [-2, 3], y ∈ [-2, 4].
fn raycast_box(x: f32, y: f32, theta: f32) -> LaserScan {
    let n = 360;
    let mut angles = Vec::with_capacity(n);
    let mut ranges = Vec::with_capacity(n);

    for i in 0..n {
        let a = (i as f32 / n as f32) * std::f32::consts::TAU;
        let (s, c) = (theta + a).sin_cos();

        let mut range = f32::MAX;
        if c > 1e-6 {
            range = range.min((3.0 - x) / c);
        } else if c < -1e-6 {
            range = range.min((-2.0 - x) / c);
        }
        if s > 1e-6 {
            range = range.min((4.0 - y) / s);
        } else if s < -1e-6 {
            range = range.min((-2.0 - y) / s);
        }

        angles.push(a);
        ranges.push(range);
    }

    LaserScan::new(angles, ranges)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_straight_line_accumulates_half_meter() {
    let world = world();
    let mut odom = estimator();

    // Zero scan, then five 10cm steps along x
    for step in 0..=5 {
        let x = step as f32 * 0.1;
        let update = odom.process(&scan_at(&world, x, 0.0, 0.0, step)).unwrap();
        if step > 0 {
            assert_eq!(update.phase, UpdatePhase::Accepted);
        }
    }

    let pose = odom.pose();
    assert_relative_eq!(pose.x.mean, 0.5, epsilon = 0.02);
    assert_relative_eq!(pose.y.mean, 0.0, epsilon = 0.02);
    assert_relative_eq!(pose.theta.mean, 0.0, epsilon = 0.5);
    assert_eq!(odom.scans_accepted(), 5);
}

#[test]
fn test_single_scan_keeps_initial_pose() {
    let world = world();
    let config = OdometryConfig::default();
    let initial =
        PoseBelief::origin(config.initial.translation_variance, config.initial.rotation_variance)
            .unwrap();
    let mut odom = OdometryEstimator::new(config).unwrap();

    odom.process(&scan_at(&world, 0.0, 0.0, 0.0, 0)).unwrap();

    assert_eq!(*odom.pose(), initial);
    assert_eq!(odom.memory().anchor_len(), 1);
    assert_eq!(odom.memory().recent_len(), 1);
}

#[test]
fn test_identical_scans_leave_pose_unchanged() {
    let world = world();
    let mut odom = estimator();

    odom.process(&scan_at(&world, 0.0, 0.0, 0.0, 0)).unwrap();
    let before = odom.pose().clone();

    for t in 1..4 {
        let update = odom.process(&scan_at(&world, 0.0, 0.0, 0.0, t)).unwrap();
        assert_eq!(update.phase, UpdatePhase::Rejected);
    }

    let after = odom.pose();
    assert_relative_eq!(after.x.mean, before.x.mean, epsilon = 1e-5);
    assert_relative_eq!(after.y.mean, before.y.mean, epsilon = 1e-5);
    assert_relative_eq!(after.theta.mean, before.theta.mean, epsilon = 1e-4);
    assert_eq!(odom.memory().recent_len(), 1);
    assert_eq!(odom.memory().anchor_len(), 4);
}

#[test]
fn test_rotation_in_place() {
    let world = world();
    let mut odom = estimator();

    for (t, theta) in [0.0, 5.0, 10.0, 15.0].into_iter().enumerate() {
        odom.process(&scan_at(&world, 0.0, 0.0, theta, t as u64)).unwrap();
    }

    let pose = odom.pose();
    assert_relative_eq!(pose.theta.mean, 15.0, epsilon = 1.0);
    assert_relative_eq!(pose.x.mean, 0.0, epsilon = 0.03);
    assert_relative_eq!(pose.y.mean, 0.0, epsilon = 0.03);
}

#[test]
fn test_full_turn_folds_heading() {
    let world = world();
    let mut odom = estimator();

    for step in 0..=36u64 {
        let true_heading = step as f32 * 10.0;
        odom.process(&scan_at(&world, 0.0, 0.0, true_heading, step))
            .unwrap();

        let heading = odom.pose().theta.mean;
        assert!(
            (-180.0..=180.0).contains(&heading),
            "heading {heading} not folded at step {step}"
        );
        assert!(
            degrees_diff(heading, true_heading).abs() < 3.0,
            "heading {heading} vs {true_heading} at step {step}"
        );
    }

    let pose = odom.pose();
    assert!(degrees_diff(pose.theta.mean, 0.0).abs() < 3.0);
    assert_relative_eq!(pose.x.mean, 0.0, epsilon = 0.03);
    assert_relative_eq!(pose.y.mean, 0.0, epsilon = 0.03);
    assert_eq!(odom.scans_accepted(), 36);
}

#[test]
fn test_combined_motion() {
    let world = world();
    let mut odom = estimator();

    for k in 0..=4u64 {
        let k_f = k as f32;
        odom.process(&scan_at(&world, 0.05 * k_f, 0.02 * k_f, 2.5 * k_f, k))
            .unwrap();
    }

    let pose = odom.pose();
    assert_relative_eq!(pose.x.mean, 0.2, epsilon = 0.03);
    assert_relative_eq!(pose.y.mean, 0.08, epsilon = 0.03);
    assert_relative_eq!(pose.theta.mean, 10.0, epsilon = 1.0);
}

#[test]
fn test_memory_stays_bounded_on_long_run() {
    let world = world();
    let mut config = OdometryConfig::default();
    config.memory.capacity = 4;
    let mut odom = OdometryEstimator::new(config).unwrap();

    let zero = scan_at(&world, 0.0, 0.0, 0.0, 0);
    odom.process(&zero).unwrap();

    for step in 1..12u64 {
        odom.process(&scan_at(&world, step as f32 * 0.03, 0.0, 0.0, step))
            .unwrap();
        assert!(odom.memory().recent_len() <= 4);
        assert!(odom.memory().anchor_len() <= 4);
        assert_eq!(odom.memory().anchor_head(), Some(&zero.data));
    }

    assert_eq!(odom.memory().recent_len(), 4);
    assert_eq!(odom.memory().anchor_len(), 4);
    assert_relative_eq!(odom.pose().x.mean, 0.33, epsilon = 0.03);
}

#[test]
fn test_polar_replay_through_pipeline() {
    let mut recording = tempfile::NamedTempFile::new().unwrap();
    for step in 0..=3u64 {
        let frame = RecordedFrame::Polar {
            timestamp_us: step * 100_000,
            scan: raycast_box(step as f32 * 0.1, 0.0, 0.0),
        };
        writeln!(recording, "{}", serde_json::to_string(&frame).unwrap()).unwrap();
    }
    recording.flush().unwrap();

    let mut source = RecordedSource::open(recording.path()).unwrap();
    let mut sink = JsonLinesSink::new(Vec::new());
    let mut pipeline = OdometryPipeline::new(estimator());

    let (stats, reason) = pipeline.run(&mut source, &mut sink, &AtomicBool::new(true));

    assert!(matches!(reason, StopReason::EndOfStream));
    assert_eq!(stats.processed, 4);
    assert_eq!(stats.skipped, 0);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let last: serde_json::Value = serde_json::from_str(output.lines().last().unwrap()).unwrap();
    assert_eq!(last["timestamp_us"], 300_000);

    let x = last["pose"]["x"]["mean"].as_f64().unwrap();
    let theta = last["pose"]["theta"]["mean"].as_f64().unwrap();
    assert_relative_eq!(x, 0.3, epsilon = 0.05);
    assert_relative_eq!(theta, 0.0, epsilon = 1.0);

    let pose = pipeline.estimator().pose();
    assert_relative_eq!(pose.x.mean as f64, x, epsilon = 1e-6);
}
