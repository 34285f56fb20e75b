//! Scan preprocessing (range gating, polar to Cartesian conversion).
//!
//! ```text
//! LaserScan ──► RangeFilter ──► ScanConverter ──► PointCloud2D
//! ```

mod converter;
mod range_filter;

pub use converter::{ScanConverter, ScanConverterConfig};
pub use range_filter::{RangeFilter, RangeFilterConfig};
