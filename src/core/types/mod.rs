//! Core data types for odometry.
//!
//! - [`Point2D`]: 2D point in meters
//! - [`RigidTransform2D`]: rotation + translation in the plane
//! - [`PointCloud2D`]: a scan in Cartesian coordinates
//! - [`LaserScan`]: a scan in polar coordinates, as recorded
//! - [`Timestamped<T>`]: a scan with its acquisition time
//! - [`GaussianBelief`], [`PoseBelief`]: probabilistic pose state

mod belief;
mod pose;
mod scan;

pub use belief::{BOUND_SIGMAS, BeliefError, GaussianBelief, PoseBelief};
pub use pose::{Point2D, RigidTransform2D};
pub use scan::{LaserScan, PointCloud2D, Timestamped};
