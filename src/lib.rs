//! Gati - 2D LiDAR scan-matching odometry
//!
//! Estimates a moving LiDAR's planar pose (x, y, heading) from a stream of
//! range scans. Each scan is registered with point-to-point ICP against the
//! previous accepted scan and against a fixed zero scan; both results are
//! fused into a Gaussian pose belief.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                      io/                            │  ← Infrastructure
//! │            (source, sink, pipeline)                 │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │         (odometry estimator, scan memory)           │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  algorithms/                        │  ← Core algorithms
//! │                 (ICP matching)                      │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │           (range filter, conversion)                │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │          (types, beliefs, angle math)               │
//! └─────────────────────────────────────────────────────┘
//! ```

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms (depends on core)
// ============================================================================
pub mod algorithms;

// ============================================================================
// Layer 4: Odometry engine (depends on core, algorithms)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 5: I/O infrastructure (depends on all layers)
// ============================================================================
pub mod io;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use crate::core::math;
pub use crate::core::types::{BeliefError, GaussianBelief, PoseBelief};
pub use crate::core::types::{LaserScan, PointCloud2D};
pub use crate::core::types::{Point2D, RigidTransform2D, Timestamped};

// Sensors - Preprocessing
pub use sensors::preprocessing::{
    RangeFilter, RangeFilterConfig, ScanConverter, ScanConverterConfig,
};

// Algorithms - Matching
pub use algorithms::matching::{
    IcpConfig, PointToPointIcp, PoseDelta, Registration, RegistrationError, RegistrationSummary,
};

// Engine - Odometry
pub use engine::odometry::{
    EstimatorError, EstimatorState, OdometryConfig, OdometryEstimator, OdometryUpdate, ScanMemory,
    UpdatePhase,
};

// I/O
pub use io::{
    JsonLinesSink, LogSink, OdometryPipeline, PipelineStats, PoseSink, RecordedFrame,
    RecordedSource, ScanSource, SinkError, SourceError, StopReason,
};
