//! Point-to-Point Iterative Closest Point (ICP) registration.
//!
//! Aligns a source cloud onto a reference cloud by iteratively:
//! 1. Finding nearest neighbor correspondences
//! 2. Computing the optimal rigid transform for those pairs
//! 3. Applying it to the source and accumulating it into the total
//!
//! # Algorithm
//!
//! ```text
//! Input: Reference R, Source S, budget N, tolerance ε
//! Output: Transform T* mapping S onto R
//!
//! 0. Truncate R and S to L = min(|R|, |S|) points
//! 1. For each iteration up to N:
//!    a. Two nearest neighbors in R for each point in S'; the target is
//!       the closest point on the line through them
//!    b. Drop pairs beyond max_correspondence_distance and the worst
//!       outlier_ratio of the rest
//!    c. Closed-form 2D fit ΔT (centroids + atan2 rotation)
//!    d. S' = ΔT(S'),  T* = ΔT ∘ T*
//!    e. Stop if |mse_prev - mse| < ε
//! 2. Return T*, S', nearest-neighbor mse of S', iterations
//! ```
//!
//! Targets lie on the neighbor line rather than on a sample, so a wall that
//! slides along itself by more than half its sample spacing still pulls
//! the source the right way.
//!
//! Truncation discards points past index L; it does not resample.

use serde::Deserialize;

use super::nearest_neighbor::NearestNeighborIndex;
use super::{Registration, RegistrationError};
use crate::core::types::{Point2D, PointCloud2D, RigidTransform2D};

/// Configuration for Point-to-Point ICP.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct IcpConfig {
    /// Reference clouds with at least this many points use a k-d tree for
    /// correspondence search; smaller ones use a linear scan.
    ///
    /// 0 disables the tree entirely.
    /// Default: 64
    pub kdtree_min_points: usize,

    /// Maximum correspondence distance (meters).
    ///
    /// Point pairs farther than this are rejected as outliers.
    /// Default: 1.0
    pub max_correspondence_distance: f32,

    /// Outlier rejection ratio (0.0 to 1.0).
    ///
    /// After distance gating, reject this fraction of the worst
    /// correspondences.
    /// Default: 0.1
    pub outlier_ratio: f32,

    /// Fewer surviving correspondences than this (or than the cloud has
    /// points, if smaller) ends the iteration early.
    /// Default: 10
    pub min_correspondences: usize,
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self {
            kdtree_min_points: 64,
            max_correspondence_distance: 1.0,
            outlier_ratio: 0.1,
            min_correspondences: 10,
        }
    }
}

/// Point-to-Point ICP scan registration.
///
/// Suitable for small to medium motion between scans (<20cm, <10°).
/// Never fails for lack of convergence: callers read `error` as a
/// quality signal.
#[derive(Debug, Clone, Default)]
pub struct PointToPointIcp {
    config: IcpConfig,
}

/// Source point `source` paired with `target` on the reference.
#[derive(Debug, Clone, Copy)]
struct Correspondence {
    source: usize,
    target: Point2D,
    distance_sq: f32,
}

impl PointToPointIcp {
    /// Create a new ICP matcher with the given configuration.
    pub fn new(config: IcpConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &IcpConfig {
        &self.config
    }

    /// Register `source` onto `reference`.
    ///
    /// Fails only when truncation leaves no points.
    pub fn register(
        &self,
        reference: &PointCloud2D,
        source: &PointCloud2D,
        max_iterations: u32,
        tolerance: f32,
    ) -> Result<Registration, RegistrationError> {
        let len = reference.len().min(source.len());
        if len == 0 {
            return Err(RegistrationError::InsufficientPoints {
                reference_len: reference.len(),
                source_len: source.len(),
            });
        }

        let reference = reference.truncated(len);
        let mut current = source.truncated(len);
        let index = NearestNeighborIndex::build(&reference, self.config.kdtree_min_points);
        let min_pairs = self.config.min_correspondences.clamp(1, len);

        let mut correspondences = Vec::with_capacity(len);
        let mut total = RigidTransform2D::identity();
        let mut prev_error = f32::INFINITY;
        let mut iterations = 0u32;

        for iter in 0..max_iterations {
            iterations = iter + 1;

            self.find_correspondences(&index, &reference, &current, &mut correspondences);
            if correspondences.len() < min_pairs {
                log::debug!(
                    "ICP: {} of {} correspondences survived, stopping",
                    correspondences.len(),
                    len
                );
                break;
            }

            let error = correspondences.iter().map(|c| c.distance_sq).sum::<f32>()
                / correspondences.len() as f32;
            let step = best_fit_transform(&current, &correspondences);

            current.transform_mut(&step);
            total = step.compose(&total);

            if (prev_error - error).abs() < tolerance {
                break;
            }
            prev_error = error;
        }

        let error = nearest_error(&index, &current);

        log::debug!(
            "ICP: {} pts, {} iters, mse {:.6}, t=({:+.4}, {:+.4}) θ={:+.3}°",
            len,
            iterations,
            error,
            total.tx,
            total.ty,
            total.theta.to_degrees()
        );

        Ok(Registration {
            transform: total,
            matched: current,
            error,
            iterations,
        })
    }

    /// Fill `out` with the surviving correspondences for every source point.
    fn find_correspondences(
        &self,
        index: &NearestNeighborIndex<'_>,
        reference: &PointCloud2D,
        source: &PointCloud2D,
        out: &mut Vec<Correspondence>,
    ) {
        out.clear();
        let max_dist_sq = self.config.max_correspondence_distance.powi(2);

        for (i, point) in source.iter().enumerate() {
            let (first, second) = index.nearest_two(&point);
            if first.distance_sq > max_dist_sq {
                continue;
            }

            let anchor = reference.point_at(first.index);
            let target = match second {
                Some(n) => project_onto_line(&point, &anchor, &reference.point_at(n.index)),
                None => anchor,
            };
            out.push(Correspondence {
                source: i,
                target,
                distance_sq: point.distance_squared(&target),
            });
        }

        // Apply outlier rejection
        if self.config.outlier_ratio > 0.0 && !out.is_empty() {
            out.sort_by(|a, b| a.distance_sq.total_cmp(&b.distance_sq));

            let keep = ((1.0 - self.config.outlier_ratio) * out.len() as f32) as usize;
            out.truncate(keep.max(self.config.min_correspondences));
        }
    }
}

/// Closest point to `p` on the line through `a` and `b`.
///
/// Coincident `a` and `b` leave `a`.
fn project_onto_line(p: &Point2D, a: &Point2D, b: &Point2D) -> Point2D {
    let (ex, ey) = (b.x - a.x, b.y - a.y);
    let len_sq = ex * ex + ey * ey;
    if len_sq < 1e-12 {
        return *a;
    }
    let t = ((p.x - a.x) * ex + (p.y - a.y) * ey) / len_sq;
    Point2D::new(a.x + t * ex, a.y + t * ey)
}

/// Mean squared distance from each source point to its nearest reference
/// point.
fn nearest_error(index: &NearestNeighborIndex<'_>, source: &PointCloud2D) -> f32 {
    let sum_sq: f32 = source.iter().map(|p| index.nearest(&p).distance_sq).sum();
    sum_sq / source.len() as f32
}

/// Least-squares rigid transform taking each source point onto its target.
///
/// For 2D the optimal rotation has a closed form:
/// ```text
/// θ = atan2(Σ (sx·ry − sy·rx), Σ (sx·rx + sy·ry))     (centered coordinates)
/// t = c_ref − R(θ)·c_src
/// ```
fn best_fit_transform(source: &PointCloud2D, pairs: &[Correspondence]) -> RigidTransform2D {
    let n = pairs.len() as f32;
    let mut src_c = Point2D::default();
    let mut ref_c = Point2D::default();

    for pair in pairs {
        src_c.x += source.xs[pair.source];
        src_c.y += source.ys[pair.source];
        ref_c.x += pair.target.x;
        ref_c.y += pair.target.y;
    }
    src_c.x /= n;
    src_c.y /= n;
    ref_c.x /= n;
    ref_c.y /= n;

    let mut cross = 0.0f32;
    let mut dot = 0.0f32;
    for pair in pairs {
        let sx = source.xs[pair.source] - src_c.x;
        let sy = source.ys[pair.source] - src_c.y;
        let rx = pair.target.x - ref_c.x;
        let ry = pair.target.y - ref_c.y;
        cross += sx * ry - sy * rx;
        dot += sx * rx + sy * ry;
    }

    let theta = cross.atan2(dot);
    let (sin_t, cos_t) = theta.sin_cos();
    RigidTransform2D::new(
        theta,
        ref_c.x - (src_c.x * cos_t - src_c.y * sin_t),
        ref_c.y - (src_c.x * sin_t + src_c.y * cos_t),
    )
}
