//! Mathematical primitives for planar odometry.
//!
//! Angle normalization in radians (transforms) and degrees (heading belief).

use std::f32::consts::PI;

/// Normalize angle to [-π, π].
///
/// # Example
/// ```
/// use gati::core::math::normalize_angle;
/// use std::f32::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-6);
/// assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-6);
/// ```
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    } else if a < -PI {
        a += 2.0 * PI;
    }
    a
}

/// Normalize a heading in degrees to [-180, 180].
///
/// # Example
/// ```
/// use gati::core::math::normalize_degrees;
///
/// assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-4);
/// assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
/// ```
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a < -180.0 {
        a += 360.0;
    }
    a
}

/// Shortest angular difference from `a` to `b` in degrees.
#[inline]
pub fn degrees_diff(a: f32, b: f32) -> f32 {
    normalize_degrees(b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle_zero() {
        assert_relative_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn test_normalize_angle_wrap() {
        assert_relative_eq!(normalize_angle(2.0 * PI), 0.0, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-6);
        assert_relative_eq!(normalize_angle(-3.0 * PI), -PI, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(0.0), 0.0);
        assert_relative_eq!(normalize_degrees(180.0), 180.0);
        assert_relative_eq!(normalize_degrees(-180.0), -180.0);
        assert_relative_eq!(normalize_degrees(540.0), 180.0, epsilon = 1e-4);
        assert_relative_eq!(normalize_degrees(725.0), 5.0, epsilon = 1e-4);
        assert_relative_eq!(normalize_degrees(-725.0), -5.0, epsilon = 1e-4);
    }

    #[test]
    fn test_degrees_diff_crossing_seam() {
        assert_relative_eq!(degrees_diff(179.0, -179.0), 2.0, epsilon = 1e-4);
        assert_relative_eq!(degrees_diff(-179.0, 179.0), -2.0, epsilon = 1e-4);
    }
}
