//! Scalar Gaussian beliefs and the planar pose belief built from them.
//!
//! # Algebra
//!
//! | Operation  | Mean                              | Variance              |
//! |------------|-----------------------------------|-----------------------|
//! | `add`      | μa + μb                           | σa² + σb²             |
//! | `subtract` | μa − μb                           | σa² + σb²             |
//! | `scale(k)` | μa / k                            | σa²                   |
//! | `fuse`     | (σa²·μb + σb²·μa) / (σa² + σb²)   | σa²·σb² / (σa² + σb²) |
//! | `negate`   | −μa                               | σa²                   |
//!
//! `add`/`subtract` combine independent quantities, so uncertainty grows.
//! `fuse` combines two estimates of the same quantity, so it shrinks.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of standard deviations used for interval bounds.
pub const BOUND_SIGMAS: f32 = 3.0;

/// Errors from Gaussian arithmetic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeliefError {
    #[error("Invalid variance: {0} (must be finite and non-negative)")]
    InvalidVariance(f32),

    #[error("Invalid divisor: {0} (must be finite and non-zero)")]
    InvalidDivisor(f32),

    #[error("Cannot fuse two beliefs that both have zero variance")]
    DegenerateFusion,
}

/// A scalar normally-distributed estimate.
///
/// The label is diagnostic only and never affects the math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBelief {
    pub mean: f32,
    pub variance: f32,
    pub label: String,
}

impl GaussianBelief {
    /// Create a belief, rejecting negative or non-finite variance.
    pub fn new(mean: f32, variance: f32, label: impl Into<String>) -> Result<Self, BeliefError> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(BeliefError::InvalidVariance(variance));
        }
        Ok(Self {
            mean,
            variance,
            label: label.into(),
        })
    }

    /// Zero-mean belief, e.g. process noise.
    pub fn zero_mean(variance: f32, label: impl Into<String>) -> Result<Self, BeliefError> {
        Self::new(0.0, variance, label)
    }

    /// Standard deviation.
    #[inline]
    pub fn std_dev(&self) -> f32 {
        self.variance.sqrt()
    }

    /// Sum of two independent quantities.
    pub fn add(&self, other: &GaussianBelief) -> GaussianBelief {
        GaussianBelief {
            mean: self.mean + other.mean,
            variance: self.variance + other.variance,
            label: format!("{}+{}", self.label, other.label),
        }
    }

    /// Difference of two independent quantities. Variances still add.
    pub fn subtract(&self, other: &GaussianBelief) -> GaussianBelief {
        GaussianBelief {
            mean: self.mean - other.mean,
            variance: self.variance + other.variance,
            label: format!("{}-{}", self.label, other.label),
        }
    }

    /// Divide the mean by `k` without touching the variance.
    pub fn scale(&self, k: f32) -> Result<GaussianBelief, BeliefError> {
        if !k.is_finite() || k == 0.0 {
            return Err(BeliefError::InvalidDivisor(k));
        }
        Ok(GaussianBelief {
            mean: self.mean / k,
            variance: self.variance,
            label: format!("{}/{:.2}", self.label, k),
        })
    }

    /// Normalized product of two estimates of the same quantity.
    ///
    /// The result's variance is never larger than either input's. If one
    /// input has zero variance the result collapses onto it.
    pub fn fuse(&self, other: &GaussianBelief) -> Result<GaussianBelief, BeliefError> {
        let total = self.variance + other.variance;
        if total <= 0.0 {
            return Err(BeliefError::DegenerateFusion);
        }
        Ok(GaussianBelief {
            mean: (self.variance * other.mean + other.variance * self.mean) / total,
            variance: (self.variance * other.variance) / total,
            label: format!("{}*{}", self.label, other.label),
        })
    }

    /// Negated mean, same variance and label.
    pub fn negate(&self) -> GaussianBelief {
        GaussianBelief {
            mean: -self.mean,
            variance: self.variance,
            label: self.label.clone(),
        }
    }

    /// Same belief under a new label.
    pub fn relabel(self, label: impl Into<String>) -> GaussianBelief {
        GaussianBelief {
            label: label.into(),
            ..self
        }
    }

    /// Value `deviations` standard deviations from the mean (signed).
    #[inline]
    pub fn std_deviation_point(&self, deviations: f32) -> f32 {
        self.mean + self.std_dev() * deviations
    }

    /// Mean − 3σ.
    #[inline]
    pub fn lower_bound(&self) -> f32 {
        self.std_deviation_point(-BOUND_SIGMAS)
    }

    /// Mean + 3σ.
    #[inline]
    pub fn upper_bound(&self) -> f32 {
        self.std_deviation_point(BOUND_SIGMAS)
    }

    /// `a < b`: a's lower bound is below b's.
    #[inline]
    pub fn is_below(&self, other: &GaussianBelief) -> bool {
        self.lower_bound() < other.lower_bound()
    }

    /// `a > b`: a's upper bound is above b's.
    #[inline]
    pub fn is_above(&self, other: &GaussianBelief) -> bool {
        self.upper_bound() > other.upper_bound()
    }

    /// `a == b`: both `is_below` and `is_above` hold, i.e. a's interval
    /// strictly contains b's.
    ///
    /// This is asymmetric on purpose (`a.envelops(b)` implies
    /// `!b.envelops(a)`), which is why it is not exposed through `PartialEq`.
    #[inline]
    pub fn envelops(&self, other: &GaussianBelief) -> bool {
        self.is_below(other) && self.is_above(other)
    }

    /// Lowest lower bound and highest upper bound across `beliefs`.
    ///
    /// Picks the minimum with [`is_below`](Self::is_below) and the maximum with
    /// [`is_above`](Self::is_above), which is the range a plot of all the
    /// beliefs needs. Returns `None` for an empty input.
    pub fn span<'a, I>(beliefs: I) -> Option<(f32, f32)>
    where
        I: IntoIterator<Item = &'a GaussianBelief>,
    {
        let mut iter = beliefs.into_iter();
        let first = iter.next()?;
        let (mut min, mut max) = (first, first);
        for b in iter {
            if b.is_below(min) {
                min = b;
            }
            if b.is_above(max) {
                max = b;
            }
        }
        Some((min.lower_bound(), max.upper_bound()))
    }
}

impl fmt::Display for GaussianBelief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(μ = {:.3}, var = {:.3})",
            self.label, self.mean, self.variance
        )
    }
}

/// Planar pose as three independent Gaussians.
///
/// No cross-covariance is modeled. x and y are in meters, theta in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseBelief {
    pub x: GaussianBelief,
    pub y: GaussianBelief,
    pub theta: GaussianBelief,
}

impl PoseBelief {
    /// Pose at the origin with the given initial variances.
    pub fn origin(xy_variance: f32, theta_variance: f32) -> Result<Self, BeliefError> {
        Ok(Self {
            x: GaussianBelief::new(0.0, xy_variance, "x")?,
            y: GaussianBelief::new(0.0, xy_variance, "y")?,
            theta: GaussianBelief::new(0.0, theta_variance, "theta")?,
        })
    }

    /// Restore the canonical `x`/`y`/`theta` labels after an update.
    pub fn relabeled(self) -> Self {
        Self {
            x: self.x.relabel("x"),
            y: self.y.relabel("y"),
            theta: self.theta.relabel("theta"),
        }
    }

    /// Heading mean in radians.
    #[inline]
    pub fn heading_rad(&self) -> f32 {
        self.theta.mean.to_radians()
    }
}

impl fmt::Display for PoseBelief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.theta)
    }
}
