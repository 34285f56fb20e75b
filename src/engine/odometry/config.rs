//! Odometry estimator configuration.
//!
//! Every section deserializes with defaults, so a TOML file only needs the
//! values it overrides:
//!
//! ```toml
//! [memory]
//! capacity = 32
//!
//! [motion_gate]
//! min_translation = 0.01
//! min_rotation_deg = 2.0
//!
//! [adaptive]
//! base_variance = 0.01
//! error_reference = 0.0001
//! ```

use serde::Deserialize;

use super::EstimatorError;
use crate::algorithms::matching::IcpConfig;

/// Scan window sizing.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Scans kept per window (anchor window includes the pinned zero scan).
    /// Default: 32
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 32 }
    }
}

/// Iteration budget for one registration pass.
///
/// Fields missing from a TOML section fall back to the relative-pass values.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RegistrationPassConfig {
    /// Maximum ICP iterations.
    pub max_iterations: u32,

    /// Stop when the mean squared error changes by less than this (m²).
    pub tolerance: f32,
}

impl RegistrationPassConfig {
    /// Scan-to-scan pass: cheap, runs on every frame.
    pub fn relative() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-8,
        }
    }

    /// Scan-to-zero pass: tighter tolerance, larger budget.
    pub fn anchor() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

impl Default for RegistrationPassConfig {
    fn default() -> Self {
        Self::relative()
    }
}

/// Threshold below which a relative delta is treated as sensor noise.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MotionGateConfig {
    /// Minimum |dx| or |dy| to accept (meters).
    /// Default: 0.01
    pub min_translation: f32,

    /// Minimum |dθ| to accept (degrees).
    /// Default: 2.0
    pub min_rotation_deg: f32,
}

impl Default for MotionGateConfig {
    fn default() -> Self {
        Self {
            min_translation: 0.01,
            min_rotation_deg: 2.0,
        }
    }
}

impl MotionGateConfig {
    pub fn accepts(&self, dx: f32, dy: f32, dtheta_deg: f32) -> bool {
        dx.abs() >= self.min_translation
            || dy.abs() >= self.min_translation
            || dtheta_deg.abs() >= self.min_rotation_deg
    }
}

/// Variances of the relative update.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Variance of a relative translation measurement (m²).
    /// Default: 1e-5
    pub relative_translation_variance: f32,

    /// Variance of a relative heading measurement (deg²).
    ///
    /// Must stay well below `process_rotation_variance`, otherwise each
    /// accepted step applies only part of the measured rotation.
    /// Default: 0.01
    pub relative_rotation_variance: f32,

    /// Zero-mean process noise added to x and y before each accepted
    /// update (m²).
    /// Default: 0.01
    pub process_translation_variance: f32,

    /// Zero-mean process noise added to theta before each accepted
    /// update (deg²).
    /// Default: 4.0
    pub process_rotation_variance: f32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            relative_translation_variance: 1e-5,
            relative_rotation_variance: 0.01,
            process_translation_variance: 0.01,
            process_rotation_variance: 4.0,
        }
    }
}

/// Error-to-variance mapping for the anchor correction.
///
/// ```text
/// v = base_variance · clamp(error / error_reference, clamp_min, clamp_max)
/// ```
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Variance of a perfect anchor registration.
    /// Default: 0.01
    pub base_variance: f32,

    /// Residual (m²) considered a good registration.
    /// Default: 1e-4
    pub error_reference: f32,

    /// Default: 1.0
    pub clamp_min: f32,

    /// Default: 100.0
    pub clamp_max: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            base_variance: 0.01,
            error_reference: 1e-4,
            clamp_min: 1.0,
            clamp_max: 100.0,
        }
    }
}

impl AdaptiveConfig {
    /// Measurement variance for an anchor registration with `error` residual.
    pub fn variance(&self, error: f32) -> f32 {
        let ratio = if error.is_finite() {
            error / self.error_reference
        } else {
            self.clamp_max
        };
        self.base_variance * ratio.clamp(self.clamp_min, self.clamp_max)
    }
}

/// Pose belief at start-up. Means are always zero.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct InitialConfig {
    /// Variance of x and y (m²).
    /// Default: 0.01
    pub translation_variance: f32,

    /// Variance of theta (deg²).
    /// Default: 1.0
    pub rotation_variance: f32,
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            translation_variance: 0.01,
            rotation_variance: 1.0,
        }
    }
}

/// Full odometry estimator configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OdometryConfig {
    pub memory: MemoryConfig,
    pub relative: RegistrationPassConfig,
    pub anchor: RegistrationPassConfig,
    pub motion_gate: MotionGateConfig,
    pub noise: NoiseConfig,
    pub adaptive: AdaptiveConfig,
    pub initial: InitialConfig,
    pub matcher: IcpConfig,
}

impl Default for OdometryConfig {
    fn default() -> Self {
        Self {
            memory: MemoryConfig::default(),
            relative: RegistrationPassConfig::relative(),
            anchor: RegistrationPassConfig::anchor(),
            motion_gate: MotionGateConfig::default(),
            noise: NoiseConfig::default(),
            adaptive: AdaptiveConfig::default(),
            initial: InitialConfig::default(),
            matcher: IcpConfig::default(),
        }
    }
}

impl OdometryConfig {
    /// Check that the configuration can drive an estimator.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if self.memory.capacity == 0 {
            return Err(invalid("memory.capacity must be at least 1"));
        }

        for (name, pass) in [("relative", &self.relative), ("anchor", &self.anchor)] {
            if !(pass.tolerance.is_finite() && pass.tolerance >= 0.0) {
                return Err(invalid(format!(
                    "{name}.tolerance must be finite and non-negative (got {})",
                    pass.tolerance
                )));
            }
        }

        for (name, value) in [
            (
                "noise.relative_translation_variance",
                self.noise.relative_translation_variance,
            ),
            (
                "noise.relative_rotation_variance",
                self.noise.relative_rotation_variance,
            ),
            ("adaptive.base_variance", self.adaptive.base_variance),
            ("adaptive.error_reference", self.adaptive.error_reference),
            ("initial.translation_variance", self.initial.translation_variance),
            ("initial.rotation_variance", self.initial.rotation_variance),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive (got {value})")));
            }
        }

        for (name, value) in [
            (
                "noise.process_translation_variance",
                self.noise.process_translation_variance,
            ),
            (
                "noise.process_rotation_variance",
                self.noise.process_rotation_variance,
            ),
            ("motion_gate.min_translation", self.motion_gate.min_translation),
            ("motion_gate.min_rotation_deg", self.motion_gate.min_rotation_deg),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!(
                    "{name} must be non-negative (got {value})"
                )));
            }
        }

        let matcher = &self.matcher;
        if !(matcher.max_correspondence_distance.is_finite()
            && matcher.max_correspondence_distance > 0.0)
        {
            return Err(invalid(format!(
                "matcher.max_correspondence_distance must be positive (got {})",
                matcher.max_correspondence_distance
            )));
        }
        if !(0.0..1.0).contains(&matcher.outlier_ratio) {
            return Err(invalid(format!(
                "matcher.outlier_ratio must be in [0, 1) (got {})",
                matcher.outlier_ratio
            )));
        }

        let AdaptiveConfig {
            clamp_min,
            clamp_max,
            ..
        } = self.adaptive;
        if !(clamp_min > 0.0 && clamp_min.is_finite() && clamp_max.is_finite())
            || clamp_min > clamp_max
        {
            return Err(invalid(format!(
                "adaptive clamp bounds must satisfy 0 < clamp_min <= clamp_max (got {clamp_min}..{clamp_max})"
            )));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> EstimatorError {
    EstimatorError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_valid() {
        assert!(OdometryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_passes_differ() {
        let config = OdometryConfig::default();
        assert!(config.anchor.max_iterations > config.relative.max_iterations);
        assert!(config.anchor.tolerance < config.relative.tolerance);
    }

    #[test]
    fn test_motion_gate() {
        let gate = MotionGateConfig::default();
        assert!(!gate.accepts(0.0, 0.0, 0.0));
        assert!(!gate.accepts(0.009, -0.009, 1.9));
        assert!(gate.accepts(0.01, 0.0, 0.0));
        assert!(gate.accepts(0.0, -0.01, 0.0));
        assert!(gate.accepts(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_adaptive_variance_is_clamped() {
        let adaptive = AdaptiveConfig::default();
        assert_relative_eq!(adaptive.variance(0.0), 0.01);
        assert_relative_eq!(adaptive.variance(5e-4), 0.05, epsilon = 1e-6);
        assert_relative_eq!(adaptive.variance(1.0), 1.0, epsilon = 1e-6);
        assert_relative_eq!(adaptive.variance(f32::INFINITY), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let mut config = OdometryConfig::default();
        config.memory.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(EstimatorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_non_positive_variance() {
        let mut config = OdometryConfig::default();
        config.noise.relative_rotation_variance = 0.0;
        assert!(config.validate().is_err());

        let mut config = OdometryConfig::default();
        config.initial.translation_variance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_matcher_rejection() {
        let mut config = OdometryConfig::default();
        config.matcher.outlier_ratio = 1.0;
        assert!(config.validate().is_err());

        let mut config = OdometryConfig::default();
        config.matcher.max_correspondence_distance = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_clamp() {
        let mut config = OdometryConfig::default();
        config.adaptive.clamp_min = 10.0;
        config.adaptive.clamp_max = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: OdometryConfig = basic_toml::from_str(
            r#"
            [memory]
            capacity = 8

            [relative]
            max_iterations = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.memory.capacity, 8);
        assert_eq!(config.relative.max_iterations, 20);
        assert_relative_eq!(config.relative.tolerance, 1e-8);
        assert_eq!(config.anchor.max_iterations, 100);
        assert_relative_eq!(config.motion_gate.min_rotation_deg, 2.0);
    }
}
