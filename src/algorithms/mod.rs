//! Core algorithms.
//!
//! # Contents
//!
//! - [`matching`]: Point-to-point ICP scan registration

pub mod matching;
