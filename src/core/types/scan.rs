//! LiDAR scan, point cloud and timestamp types.

use serde::{Deserialize, Serialize};

use super::pose::{Point2D, RigidTransform2D};

/// Raw LiDAR scan in polar coordinates.
///
/// One revolution from a spinning 2D LiDAR. Angles are kept per point
/// because Delta-2 class sensors do not sample at a uniform increment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaserScan {
    /// Beam angles in radians
    pub angles: Vec<f32>,
    /// Range measurements in meters (0 or NaN = invalid)
    pub ranges: Vec<f32>,
    /// Optional signal quality (0-255)
    #[serde(default)]
    pub intensities: Option<Vec<u8>>,
}

impl LaserScan {
    /// Create a scan from matching angle and range vectors.
    pub fn new(angles: Vec<f32>, ranges: Vec<f32>) -> Self {
        Self {
            angles,
            ranges,
            intensities: None,
        }
    }

    /// Number of beams. Extra angles or ranges beyond the shorter vector are ignored.
    #[inline]
    pub fn len(&self) -> usize {
        self.angles.len().min(self.ranges.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over (angle, range, intensity) tuples.
    pub fn iter(&self) -> impl Iterator<Item = (f32, f32, u8)> + '_ {
        self.angles
            .iter()
            .zip(self.ranges.iter())
            .enumerate()
            .map(move |(i, (&angle, &range))| {
                let intensity = self
                    .intensities
                    .as_ref()
                    .and_then(|v| v.get(i).copied())
                    .unwrap_or(0);
                (angle, range, intensity)
            })
    }
}

/// 2D point cloud in Cartesian coordinates.
///
/// Structure-of-arrays layout:
/// - `xs: Vec<f32>` (x,x,x,x...)
/// - `ys: Vec<f32>` (y,y,y,y...)
///
/// Insertion order is preserved. Registration treats the cloud as
/// unordered but uses indices for correspondence bookkeeping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud2D {
    /// X coordinates in meters
    pub xs: Vec<f32>,
    /// Y coordinates in meters
    pub ys: Vec<f32>,
}

impl PointCloud2D {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self {
            xs: Vec::new(),
            ys: Vec::new(),
        }
    }

    /// Create a point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
        }
    }

    /// Create from a vector of points (converts AoS to SoA).
    pub fn from_points(points: Vec<Point2D>) -> Self {
        let mut cloud = Self::with_capacity(points.len());
        for p in points {
            cloud.push(p);
        }
        cloud
    }

    /// Add a point.
    #[inline]
    pub fn push(&mut self, point: Point2D) {
        self.xs.push(point.x);
        self.ys.push(point.y);
    }

    /// Add a point by x, y coordinates directly.
    #[inline]
    pub fn push_xy(&mut self, x: f32, y: f32) {
        self.xs.push(x);
        self.ys.push(y);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Get point at index. Panics if out of bounds.
    #[inline]
    pub fn point_at(&self, i: usize) -> Point2D {
        Point2D::new(self.xs[i], self.ys[i])
    }

    /// Get point at index, returning None if out of bounds.
    #[inline]
    pub fn try_point_at(&self, i: usize) -> Option<Point2D> {
        Some(Point2D::new(*self.xs.get(i)?, *self.ys.get(i)?))
    }

    /// Iterate over points.
    pub fn iter(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
    }

    /// Convert back to an array-of-structs vector.
    pub fn to_points(&self) -> Vec<Point2D> {
        self.iter().collect()
    }

    /// Copy of the first `n` points (or all of them if shorter).
    pub fn truncated(&self, n: usize) -> PointCloud2D {
        let n = n.min(self.len());
        Self {
            xs: self.xs[..n].to_vec(),
            ys: self.ys[..n].to_vec(),
        }
    }

    /// Mean of all points, or `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point2D> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f32;
        let sx: f32 = self.xs.iter().sum();
        let sy: f32 = self.ys.iter().sum();
        Some(Point2D::new(sx / n, sy / n))
    }

    /// Apply a rigid transform to every point: p' = R(θ)·p + t
    pub fn transform(&self, transform: &RigidTransform2D) -> PointCloud2D {
        let mut result = self.clone();
        result.transform_mut(transform);
        result
    }

    /// In-place version of [`PointCloud2D::transform`].
    pub fn transform_mut(&mut self, transform: &RigidTransform2D) {
        let (sin_t, cos_t) = transform.theta.sin_cos();
        for (x, y) in self.xs.iter_mut().zip(self.ys.iter_mut()) {
            let px = *x;
            let py = *y;
            *x = px.mul_add(cos_t, (-py).mul_add(sin_t, transform.tx));
            *y = px.mul_add(sin_t, py.mul_add(cos_t, transform.ty));
        }
    }
}

impl FromIterator<Point2D> for PointCloud2D {
    fn from_iter<I: IntoIterator<Item = Point2D>>(iter: I) -> Self {
        let mut cloud = PointCloud2D::new();
        for p in iter {
            cloud.push(p);
        }
        cloud
    }
}

/// A scan stamped with its acquisition time (microseconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamped<T> {
    pub data: T,
    pub timestamp_us: u64,
}

impl<T> Timestamped<T> {
    pub fn new(data: T, timestamp_us: u64) -> Self {
        Self { data, timestamp_us }
    }
}
