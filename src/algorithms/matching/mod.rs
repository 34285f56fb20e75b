//! Scan registration.
//!
//! Provides point-to-point ICP for aligning two scans and the decomposition
//! of the fitted transform into an odometry delta.
//!
//! # Example
//!
//! ```
//! use gati::algorithms::matching::{IcpConfig, PoseDelta, PointToPointIcp};
//! use gati::algorithms::matching::test_utils::create_room;
//!
//! let scan = create_room(40, 4.0, 3.0);
//! let icp = PointToPointIcp::new(IcpConfig::default());
//! let result = icp.register(&scan, &scan, 50, 1e-4).unwrap();
//!
//! let delta = PoseDelta::from_transform(&result.transform);
//! assert!(delta.dx.abs() < 1e-6 && delta.dtheta_deg.abs() < 1e-6);
//! ```

mod icp;
mod nearest_neighbor;
pub mod test_utils;

pub use icp::{IcpConfig, PointToPointIcp};
pub use nearest_neighbor::NearestNeighborIndex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{PointCloud2D, RigidTransform2D};

/// Registration errors.
///
/// Non-convergence is not an error; it shows up as a large residual.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error(
        "Insufficient points for registration (reference: {reference_len}, source: {source_len})"
    )]
    InsufficientPoints {
        reference_len: usize,
        source_len: usize,
    },
}

/// Result of aligning a source cloud onto a reference cloud.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Accumulated transform mapping the (truncated) source onto the reference.
    pub transform: RigidTransform2D,

    /// The source after applying `transform`.
    pub matched: PointCloud2D,

    /// Mean squared nearest-neighbour distance of `matched` to the reference.
    pub error: f32,

    /// Iterations actually run (≤ the requested budget).
    pub iterations: u32,
}

impl Registration {
    /// Odometry delta implied by the fitted transform.
    pub fn delta(&self) -> PoseDelta {
        PoseDelta::from_transform(&self.transform)
    }

    /// Compact, serializable view without the point cloud.
    pub fn summary(&self) -> RegistrationSummary {
        RegistrationSummary {
            delta: self.delta(),
            error: self.error,
            iterations: self.iterations,
        }
    }
}

/// Sensor motion decoded from a registration transform.
///
/// The registered transform maps the older scan onto the newer one, so the
/// sensor moved by its opposite:
/// ```text
/// dx        = -tx
/// dy        = -ty
/// dtheta_deg = -degrees(asin(sin θ))
/// ```
/// Downstream fusion relies on exactly these signs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseDelta {
    /// Translation along the sensor x axis (meters)
    pub dx: f32,
    /// Translation along the sensor y axis (meters)
    pub dy: f32,
    /// Heading change (degrees)
    pub dtheta_deg: f32,
}

impl PoseDelta {
    pub fn from_transform(transform: &RigidTransform2D) -> Self {
        Self {
            dx: -transform.tx,
            dy: -transform.ty,
            dtheta_deg: -transform.sin().clamp(-1.0, 1.0).asin().to_degrees(),
        }
    }

    /// Rotate the translation into a frame with the given heading (degrees).
    ///
    /// Returns `(x, y)` in that frame.
    pub fn rotated(&self, heading_deg: f32) -> (f32, f32) {
        let (sin_h, cos_h) = heading_deg.to_radians().sin_cos();
        (
            self.dx * cos_h - self.dy * sin_h,
            self.dy * cos_h + self.dx * sin_h,
        )
    }
}

/// Per-pass registration diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RegistrationSummary {
    pub delta: PoseDelta,
    pub error: f32,
    pub iterations: u32,
}
