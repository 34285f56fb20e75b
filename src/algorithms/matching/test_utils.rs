//! Synthetic scan geometry shared by matcher tests, integration tests and
//! benchmarks.

use crate::core::types::{Point2D, PointCloud2D, RigidTransform2D};

/// Create an L-shaped point cloud (two perpendicular walls).
///
/// Adds slight noise to avoid k-d tree bucket issues with collinear points.
///
/// # Arguments
///
/// * `n` - Number of points per arm (total points = 2n - 1)
/// * `length` - Length of each arm in meters
pub fn create_l_shape(n: usize, length: f32) -> PointCloud2D {
    let mut cloud = PointCloud2D::with_capacity(2 * n);
    for i in 0..n {
        let x = (i as f32 / (n - 1) as f32) * length;
        let y_noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(x, y_noise));
    }
    for i in 1..n {
        let y = (i as f32 / (n - 1) as f32) * length;
        let x_noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(x_noise, y));
    }
    cloud
}

/// Create a room-shaped point cloud (four walls).
///
/// # Arguments
///
/// * `n` - Total points distributed across all walls
/// * `width` - Room width in meters
/// * `height` - Room height in meters
pub fn create_room(n: usize, width: f32, height: f32) -> PointCloud2D {
    let mut cloud = PointCloud2D::with_capacity(n);
    let points_per_wall = n / 4;

    // Bottom wall
    for i in 0..points_per_wall {
        let x = (i as f32 / points_per_wall as f32) * width;
        let noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(x, noise));
    }
    // Right wall
    for i in 0..points_per_wall {
        let y = (i as f32 / points_per_wall as f32) * height;
        let noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(width + noise, y));
    }
    // Top wall
    for i in 0..points_per_wall {
        let x = width - (i as f32 / points_per_wall as f32) * width;
        let noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(x, height + noise));
    }
    // Left wall
    for i in 0..points_per_wall {
        let y = height - (i as f32 / points_per_wall as f32) * height;
        let noise = (i as f32) * 0.0001;
        cloud.push(Point2D::new(noise, y));
    }
    cloud
}

/// Create a straight line point cloud along x.
pub fn create_line(n: usize, length: f32) -> PointCloud2D {
    let mut cloud = PointCloud2D::with_capacity(n);
    for i in 0..n {
        let x = (i as f32 / (n - 1) as f32) * length;
        cloud.push(Point2D::new(x, 0.0));
    }
    cloud
}

/// World points as seen from a sensor at `(x, y, theta)`.
///
/// Moving the sensor by +d shifts everything it sees by -d.
pub fn observe(world: &PointCloud2D, x: f32, y: f32, theta: f32) -> PointCloud2D {
    world.transform(&RigidTransform2D::new(theta, x, y).inverse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_create_l_shape() {
        let cloud = create_l_shape(50, 2.0);
        assert_eq!(cloud.len(), 99); // 50 + 49 (first point shared)
    }

    #[test]
    fn test_create_room() {
        let cloud = create_room(100, 4.0, 3.0);
        assert_eq!(cloud.len(), 100);
    }

    #[test]
    fn test_create_line() {
        let cloud = create_line(10, 1.0);
        assert_eq!(cloud.len(), 10);
    }

    #[test]
    fn test_observe_moves_world_opposite_to_sensor() {
        let world = PointCloud2D::from_points(vec![Point2D::new(2.0, 0.0)]);
        let seen = observe(&world, 0.5, 0.0, 0.0);
        assert_relative_eq!(seen.xs[0], 1.5);

        let seen = observe(&world, 0.0, 0.0, std::f32::consts::FRAC_PI_2);
        assert_relative_eq!(seen.xs[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(seen.ys[0], -2.0, epsilon = 1e-6);
    }
}
