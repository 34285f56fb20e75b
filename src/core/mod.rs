//! Core foundation layer.
//!
//! This is the bottom layer of the stack with no internal dependencies.
//! All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (points, transforms, scans, beliefs)
//! - [`math`]: Angle normalization in radians and degrees

pub mod math;
pub mod types;
