//! Polar to Cartesian scan conversion.

use serde::Deserialize;

use crate::core::types::{LaserScan, Point2D, PointCloud2D};

/// Mounting and angle convention of the LiDAR.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ScanConverterConfig {
    /// Offset added to every beam angle (radians).
    ///
    /// A Delta-2 mounted with its motor at the back reports angles 180°
    /// away from the robot's forward axis.
    pub angle_offset: f32,

    /// True when the sensor reports angles clockwise.
    pub clockwise: bool,

    /// Radial offset added to each range (meters).
    pub radial_offset: f32,
}

impl Default for ScanConverterConfig {
    fn default() -> Self {
        Self {
            angle_offset: 0.0,
            clockwise: false,
            radial_offset: 0.0,
        }
    }
}

/// Converts `LaserScan` (polar) to `PointCloud2D` (Cartesian).
///
/// ```text
/// a = ±(angle + angle_offset)     (negated when clockwise)
/// r = range + radial_offset
/// x = r·cos(a)
/// y = r·sin(a)
/// ```
///
/// Range validity is the [`RangeFilter`](super::RangeFilter)'s job; run it first.
#[derive(Debug, Clone, Default)]
pub struct ScanConverter {
    config: ScanConverterConfig,
}

impl ScanConverter {
    pub fn new(config: ScanConverterConfig) -> Self {
        Self { config }
    }

    pub fn to_point_cloud(&self, scan: &LaserScan) -> PointCloud2D {
        let mut cloud = PointCloud2D::with_capacity(scan.len());
        for (angle, range, _) in scan.iter() {
            let mut a = angle + self.config.angle_offset;
            if self.config.clockwise {
                a = -a;
            }
            let r = range + self.config.radial_offset;
            let (sin_a, cos_a) = a.sin_cos();
            cloud.push(Point2D::new(r * cos_a, r * sin_a));
        }
        cloud
    }
}
