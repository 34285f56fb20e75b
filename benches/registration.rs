//! Registration and Odometry Benchmarks
//!
//! - Point-to-point ICP with linear and k-d tree correspondence search
//! - One full estimator step (relative + anchor registration, fusion)
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use gati::algorithms::matching::test_utils::{create_room, observe};
use gati::{
    IcpConfig, OdometryConfig, OdometryEstimator, PointCloud2D, PointToPointIcp,
    RigidTransform2D, Timestamped,
};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Room centred on the sensor, 360 points (one Delta-2 sweep).
fn create_world() -> PointCloud2D {
    create_room(360, 4.0, 3.0).transform(&RigidTransform2D::translation(-2.0, -1.5))
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_icp(c: &mut Criterion) {
    let mut group = c.benchmark_group("icp");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));
    group.warm_up_time(Duration::from_secs(1));

    let world = create_world();
    let reference = observe(&world, 0.08, 0.02, 0.03);

    let tree = PointToPointIcp::new(IcpConfig::default());
    let linear = PointToPointIcp::new(IcpConfig {
        kdtree_min_points: 0,
        ..IcpConfig::default()
    });

    group.bench_function("kdtree/360", |b| {
        b.iter(|| {
            tree.register(black_box(&reference), black_box(&world), 50, 1e-6)
        })
    });

    group.bench_function("linear/360", |b| {
        b.iter(|| {
            linear.register(black_box(&reference), black_box(&world), 50, 1e-6)
        })
    });

    group.finish();
}

fn bench_estimator(c: &mut Criterion) {
    let mut group = c.benchmark_group("odometry");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(3));

    let world = create_world();
    let zero = Timestamped::new(world.clone(), 0);
    let next = Timestamped::new(observe(&world, 0.05, 0.0, 0.02), 100_000);

    group.bench_function("process/360", |b| {
        b.iter_batched(
            || {
                let mut odom = OdometryEstimator::new(OdometryConfig::default()).unwrap();
                odom.process(&zero).unwrap();
                odom
            },
            |mut odom| odom.process(black_box(&next)),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// Main
// ============================================================================

criterion_group!(benches, bench_icp, bench_estimator);

criterion_main!(benches);
