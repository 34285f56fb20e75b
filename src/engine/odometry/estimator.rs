//! Odometry estimator state machine.
//!
//! ```text
//! Uninitialized ──first scan──► Tracking ──scan──► Tracking ...
//! ```
//!
//! Owns the pose belief and the scan memory for its whole lifetime; the
//! driving loop feeds it one scan at a time.

use super::{EstimatorError, OdometryConfig, OdometryUpdate, ScanMemory, UpdatePhase};
use crate::algorithms::matching::{PointToPointIcp, Registration, RegistrationError};
use crate::core::math::normalize_degrees;
use crate::core::types::{GaussianBelief, PointCloud2D, PoseBelief, Timestamped};

/// Lifecycle of the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorState {
    /// No scan seen yet.
    Uninitialized,
    /// Zero scan pinned; every scan is registered and fused.
    Tracking,
}

/// Scan-matching odometry with Gaussian pose fusion.
#[derive(Debug)]
pub struct OdometryEstimator {
    config: OdometryConfig,
    matcher: PointToPointIcp,
    memory: ScanMemory,
    pose: PoseBelief,
    state: EstimatorState,
    scans_processed: u64,
    scans_accepted: u64,
}

impl OdometryEstimator {
    /// Create an estimator at the origin with the configured initial variances.
    pub fn new(config: OdometryConfig) -> Result<Self, EstimatorError> {
        config.validate()?;

        let pose = PoseBelief::origin(
            config.initial.translation_variance,
            config.initial.rotation_variance,
        )?;

        Ok(Self {
            matcher: PointToPointIcp::new(config.matcher),
            memory: ScanMemory::new(config.memory.capacity),
            pose,
            state: EstimatorState::Uninitialized,
            scans_processed: 0,
            scans_accepted: 0,
            config,
        })
    }

    pub fn config(&self) -> &OdometryConfig {
        &self.config
    }

    /// Current pose belief.
    pub fn pose(&self) -> &PoseBelief {
        &self.pose
    }

    pub fn memory(&self) -> &ScanMemory {
        &self.memory
    }

    pub fn state(&self) -> EstimatorState {
        self.state
    }

    /// Scans that produced an update.
    pub fn scans_processed(&self) -> u64 {
        self.scans_processed
    }

    /// Scans whose relative motion passed the gate.
    pub fn scans_accepted(&self) -> u64 {
        self.scans_accepted
    }

    /// Process one scan.
    ///
    /// Both registrations run before any state is touched, so an error
    /// leaves the estimator exactly as it was.
    pub fn process(
        &mut self,
        scan: &Timestamped<PointCloud2D>,
    ) -> Result<OdometryUpdate, EstimatorError> {
        let points = &scan.data;

        let (Some(latest), Some(zero)) = (self.memory.latest_recent(), self.memory.anchor_head())
        else {
            return self.seed(scan);
        };

        let relative = self.matcher.register(
            points,
            latest,
            self.config.relative.max_iterations,
            self.config.relative.tolerance,
        )?;
        let absolute = self.matcher.register(
            points,
            zero,
            self.config.anchor.max_iterations,
            self.config.anchor.tolerance,
        )?;

        let delta = relative.delta();
        let accepted = self
            .config
            .motion_gate
            .accepts(delta.dx, delta.dy, delta.dtheta_deg);

        let mut pose = self.pose.clone();
        if accepted {
            pose = self.fuse_relative(pose, &relative)?;
        } else {
            log::trace!(
                "Motion below gate: dx={:+.4} dy={:+.4} dθ={:+.2}°",
                delta.dx,
                delta.dy,
                delta.dtheta_deg
            );
        }
        let pose = self.fuse_absolute(pose, &absolute)?.relabeled();

        // Commit
        self.pose = pose;
        if accepted {
            self.memory.push_recent(points.clone());
            self.scans_accepted += 1;
        }
        let anchored = points.transform(&absolute.transform.inverse());
        self.memory.push_anchored(anchored.clone());
        self.scans_processed += 1;

        log::debug!(
            "Odometry @{}: {} [rel err {:.6}, abs err {:.6}, {}]",
            scan.timestamp_us,
            self.pose,
            relative.error,
            absolute.error,
            if accepted { "accepted" } else { "rejected" }
        );

        Ok(OdometryUpdate {
            timestamp_us: scan.timestamp_us,
            pose: self.pose.clone(),
            phase: if accepted {
                UpdatePhase::Accepted
            } else {
                UpdatePhase::Rejected
            },
            relative: Some(relative.summary()),
            absolute: Some(absolute.summary()),
            matched: relative.matched,
            anchored,
        })
    }

    /// First scan: pin the zero scan, no fusion.
    fn seed(
        &mut self,
        scan: &Timestamped<PointCloud2D>,
    ) -> Result<OdometryUpdate, EstimatorError> {
        if scan.data.is_empty() {
            return Err(RegistrationError::InsufficientPoints {
                reference_len: 0,
                source_len: 0,
            }
            .into());
        }

        self.memory.seed(&scan.data);
        self.state = EstimatorState::Tracking;
        self.scans_processed += 1;

        log::info!(
            "Odometry seeded with {} points @{}",
            scan.data.len(),
            scan.timestamp_us
        );

        Ok(OdometryUpdate {
            timestamp_us: scan.timestamp_us,
            pose: self.pose.clone(),
            phase: UpdatePhase::Seeded,
            relative: None,
            absolute: None,
            matched: scan.data.clone(),
            anchored: scan.data.clone(),
        })
    }

    /// Fuse a scan-to-scan delta into the pose.
    ///
    /// ```text
    /// θ ← fuse(θ + N(0, qθ), N(θ.μ + dθ, rθ))
    /// (gx, gy) = R(θ.μ)·(dx, dy)
    /// x ← fuse(x + N(0, q), N(x.μ + gx, r))        (same for y)
    /// ```
    fn fuse_relative(
        &self,
        pose: PoseBelief,
        registration: &Registration,
    ) -> Result<PoseBelief, EstimatorError> {
        let noise = &self.config.noise;
        let delta = registration.delta();

        let theta_noise = GaussianBelief::zero_mean(noise.process_rotation_variance, "qθ")?;
        let theta_measured = GaussianBelief::new(
            pose.theta.mean + delta.dtheta_deg,
            noise.relative_rotation_variance,
            "dθ",
        )?;
        let theta = pose.theta.add(&theta_noise).fuse(&theta_measured)?;

        let (gx, gy) = delta.rotated(theta.mean);
        let xy_noise = GaussianBelief::zero_mean(noise.process_translation_variance, "q")?;
        let x_measured = GaussianBelief::new(
            pose.x.mean + gx,
            noise.relative_translation_variance,
            "dx",
        )?;
        let y_measured = GaussianBelief::new(
            pose.y.mean + gy,
            noise.relative_translation_variance,
            "dy",
        )?;

        Ok(PoseBelief {
            x: pose.x.add(&xy_noise).fuse(&x_measured)?,
            y: pose.y.add(&xy_noise).fuse(&y_measured)?,
            theta,
        })
    }

    /// Pull the pose toward the scan-to-zero registration.
    ///
    /// ```text
    /// v = adaptive(error)
    /// θ ← fuse(wrap(θ), N(wrap(θ.μ), v))          wrap folds into [-180, 180]
    /// (ax, ay) = R(θ.μ)·(dx_abs, dy_abs)
    /// x ← fuse(x, N(ax, v))                        (same for y)
    /// ```
    ///
    /// The heading mean only folds; the worse the residual, the larger `v`
    /// and the weaker the pull on x and y.
    fn fuse_absolute(
        &self,
        pose: PoseBelief,
        registration: &Registration,
    ) -> Result<PoseBelief, EstimatorError> {
        let variance = self.config.adaptive.variance(registration.error);
        let delta = registration.delta();

        let mut theta = pose.theta;
        theta.mean = normalize_degrees(theta.mean);
        let mut theta = theta.fuse(&GaussianBelief::new(theta.mean, variance, "θwrap")?)?;
        theta.mean = normalize_degrees(theta.mean);

        let (ax, ay) = delta.rotated(theta.mean);
        let x = pose.x.fuse(&GaussianBelief::new(ax, variance, "xabs")?)?;
        let y = pose.y.fuse(&GaussianBelief::new(ay, variance, "yabs")?)?;

        Ok(PoseBelief { x, y, theta })
    }
}
