//! Sensor processing layer.
//!
//! Turns raw LiDAR frames into point clouds fit for registration.

pub mod preprocessing;
