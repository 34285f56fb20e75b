//! LiDAR odometry: scan registration fused into a Gaussian pose belief.
//!
//! # Per-scan flow
//!
//! ```text
//!            incoming scan
//!                 │
//!     ┌───────────┴────────────┐
//!     ▼                        ▼
//! ICP vs latest recent    ICP vs zero scan
//! (relative, fast)        (absolute, tight)
//!     │                        │
//! motion gate              adaptive variance
//!     │ accepted               │ v = base · clamp(err / ref)
//!     ▼                        ▼
//! fuse Δ into pose ──────► fuse absolute pose
//! push recent window       append anchor window
//! ```
//!
//! # Example
//!
//! ```
//! use gati::algorithms::matching::test_utils::{create_room, observe};
//! use gati::core::types::Timestamped;
//! use gati::engine::odometry::{OdometryConfig, OdometryEstimator};
//!
//! let world = create_room(200, 4.0, 3.0);
//! let mut estimator = OdometryEstimator::new(OdometryConfig::default()).unwrap();
//!
//! estimator.process(&Timestamped::new(observe(&world, 0.0, 0.0, 0.0), 0)).unwrap();
//! let update = estimator
//!     .process(&Timestamped::new(observe(&world, 0.1, 0.0, 0.0), 100_000))
//!     .unwrap();
//!
//! assert!(update.accepted());
//! assert!((update.pose.x.mean - 0.1).abs() < 0.01);
//! ```

mod config;
mod estimator;
mod scan_memory;

pub use config::{
    AdaptiveConfig, InitialConfig, MemoryConfig, MotionGateConfig, NoiseConfig, OdometryConfig,
    RegistrationPassConfig,
};
pub use estimator::{EstimatorState, OdometryEstimator};
pub use scan_memory::ScanMemory;

use serde::Serialize;
use thiserror::Error;

use crate::algorithms::matching::{RegistrationError, RegistrationSummary};
use crate::core::types::{BeliefError, PointCloud2D, PoseBelief};

/// Errors from the odometry estimator.
///
/// A failed scan leaves the estimator state untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("Belief update failed: {0}")]
    Belief(#[from] BeliefError),

    #[error("Registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// What the estimator did with a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    /// First scan: windows seeded, pose untouched.
    Seeded,
    /// Relative motion passed the gate and was fused.
    Accepted,
    /// Relative motion was below the gate; only the anchor pass ran.
    Rejected,
}

/// Result of processing one scan.
#[derive(Debug, Clone)]
pub struct OdometryUpdate {
    /// Timestamp of the scan (microseconds).
    pub timestamp_us: u64,

    /// Pose belief after the update.
    pub pose: PoseBelief,

    pub phase: UpdatePhase,

    /// Relative registration against the latest recent scan.
    pub relative: Option<RegistrationSummary>,

    /// Absolute registration against the zero scan.
    pub absolute: Option<RegistrationSummary>,

    /// Latest recent scan moved onto the incoming scan by the relative pass.
    pub matched: PointCloud2D,

    /// Incoming scan expressed in the zero-scan frame.
    pub anchored: PointCloud2D,
}

impl OdometryUpdate {
    /// True when the relative delta was fused into the pose.
    pub fn accepted(&self) -> bool {
        self.phase == UpdatePhase::Accepted
    }
}
