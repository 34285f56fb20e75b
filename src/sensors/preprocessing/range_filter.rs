//! Range gating filter for LiDAR scans.
//!
//! Removes points with invalid or out-of-bounds range values. Invalid
//! returns from a spinning LiDAR usually read as zero, which would otherwise
//! pile up as duplicate points at the sensor origin.

use serde::Deserialize;

use crate::core::types::{LaserScan, PointCloud2D};

/// Configuration for range filtering.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RangeFilterConfig {
    /// Minimum valid range in meters.
    ///
    /// Points closer than this are removed (may be self-reflection).
    /// Default: 0.1m
    pub min_range: f32,

    /// Maximum valid range in meters.
    ///
    /// Points farther than this are removed (unreliable).
    /// Default: 8.0m (Delta-2 class sensors)
    pub max_range: f32,
}

impl Default for RangeFilterConfig {
    fn default() -> Self {
        Self {
            min_range: 0.1,
            max_range: 8.0,
        }
    }
}

/// Range filter for removing invalid LiDAR returns.
///
/// Filters out:
/// - Ranges less than `min_range`
/// - Ranges greater than `max_range`
/// - NaN or infinite ranges
#[derive(Debug, Clone)]
pub struct RangeFilter {
    config: RangeFilterConfig,
}

impl RangeFilter {
    /// Create a new range filter with the given configuration.
    pub fn new(config: RangeFilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RangeFilterConfig {
        &self.config
    }

    /// Check if a range value is valid.
    #[inline]
    pub fn is_valid(&self, range: f32) -> bool {
        range.is_finite() && range >= self.config.min_range && range <= self.config.max_range
    }

    /// Apply range filtering to a polar scan.
    pub fn apply(&self, scan: &LaserScan) -> LaserScan {
        let mut angles = Vec::with_capacity(scan.len());
        let mut ranges = Vec::with_capacity(scan.len());
        let mut intensities = scan
            .intensities
            .as_ref()
            .map(|_| Vec::with_capacity(scan.len()));

        for (angle, range, intensity) in scan.iter() {
            if self.is_valid(range) {
                angles.push(angle);
                ranges.push(range);
                if let Some(ref mut out) = intensities {
                    out.push(intensity);
                }
            }
        }

        LaserScan {
            angles,
            ranges,
            intensities,
        }
    }

    /// Apply range filtering to a Cartesian cloud in the sensor frame.
    ///
    /// Range is the distance from the sensor origin. Point order is kept.
    pub fn apply_cloud(&self, cloud: &PointCloud2D) -> PointCloud2D {
        cloud
            .iter()
            .filter(|p| self.is_valid((p.x * p.x + p.y * p.y).sqrt()))
            .collect()
    }
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self::new(RangeFilterConfig::default())
    }
}
