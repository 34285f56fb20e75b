//! Point and rigid transform types for planar registration.

use serde::{Deserialize, Serialize};

use crate::core::math::normalize_angle;

/// A 2D point in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// X coordinate in meters
    pub x: f32,
    /// Y coordinate in meters
    pub y: f32,
}

impl Point2D {
    /// Create a new point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, other: &Point2D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point.
    #[inline]
    pub fn distance(&self, other: &Point2D) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Orientation-preserving isometry in the plane.
///
/// Maps a point `p` to `R(θ)·p + t`. Theta is kept normalized to [-π, π].
///
/// Composition is associative but not commutative:
/// ```text
/// C = A.compose(B)  ⇔  C(p) = A(B(p))
///   C.θ = normalize(A.θ + B.θ)
///   C.t = R(A.θ)·B.t + A.t
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform2D {
    /// Rotation in radians, normalized to [-π, π]
    pub theta: f32,
    /// Translation along x in meters
    pub tx: f32,
    /// Translation along y in meters
    pub ty: f32,
}

impl RigidTransform2D {
    /// Create a transform; theta is normalized.
    #[inline]
    pub fn new(theta: f32, tx: f32, ty: f32) -> Self {
        Self {
            theta: normalize_angle(theta),
            tx,
            ty,
        }
    }

    /// The identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self {
            theta: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Pure translation.
    #[inline]
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self { theta: 0.0, tx, ty }
    }

    /// Pure rotation about the origin.
    #[inline]
    pub fn rotation(theta: f32) -> Self {
        Self::new(theta, 0.0, 0.0)
    }

    /// Sine term of the rotation matrix (`R[1][0]`).
    #[inline]
    pub fn sin(&self) -> f32 {
        self.theta.sin()
    }

    /// Cosine term of the rotation matrix (`R[0][0]`).
    #[inline]
    pub fn cos(&self) -> f32 {
        self.theta.cos()
    }

    /// Row-major 3x3 homogeneous matrix.
    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        let (s, c) = self.theta.sin_cos();
        [[c, -s, self.tx], [s, c, self.ty], [0.0, 0.0, 1.0]]
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    #[inline]
    pub fn compose(&self, other: &RigidTransform2D) -> RigidTransform2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        RigidTransform2D::new(
            self.theta + other.theta,
            self.tx + other.tx * cos_t - other.ty * sin_t,
            self.ty + other.tx * sin_t + other.ty * cos_t,
        )
    }

    /// The transform that undoes this one.
    /// ```text
    /// A⁻¹:
    ///   θ = -A.θ
    ///   t = -R(A.θ)ᵀ·A.t
    /// ```
    #[inline]
    pub fn inverse(&self) -> RigidTransform2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        RigidTransform2D::new(
            -self.theta,
            -self.tx * cos_t - self.ty * sin_t,
            self.tx * sin_t - self.ty * cos_t,
        )
    }

    /// Apply this transform to a single point.
    #[inline]
    pub fn apply(&self, point: &Point2D) -> Point2D {
        let (sin_t, cos_t) = self.theta.sin_cos();
        Point2D::new(
            self.tx + point.x * cos_t - point.y * sin_t,
            self.ty + point.x * sin_t + point.y * cos_t,
        )
    }

    /// Rotation magnitude in radians.
    #[inline]
    pub fn rotation_magnitude(&self) -> f32 {
        self.theta.abs()
    }

    /// Translation magnitude in meters.
    #[inline]
    pub fn translation_magnitude(&self) -> f32 {
        (self.tx * self.tx + self.ty * self.ty).sqrt()
    }
}

impl Default for RigidTransform2D {
    fn default() -> Self {
        Self::identity()
    }
}
