//! Estimation layer.
//!
//! # Contents
//!
//! - [`odometry`]: Scan-matching odometry with Gaussian pose fusion

pub mod odometry;
