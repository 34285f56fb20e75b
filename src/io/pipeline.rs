//! Synchronous odometry loop.
//!
//! ```text
//! loop {
//!     scan   = source.next_scan()   // error → stop
//!     update = estimator.process()  // error → warn, skip scan
//!     sink.publish(update)          // error → warn, continue
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use super::sink::PoseSink;
use super::source::{ScanSource, SourceError};
use crate::engine::odometry::OdometryEstimator;

/// Counters for one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Scans the estimator turned into updates.
    pub processed: u64,
    /// Scans the estimator rejected with an error.
    pub skipped: u64,
    /// Updates the sink failed to publish.
    pub publish_failures: u64,
}

/// Why the loop ended.
#[derive(Debug)]
pub enum StopReason {
    /// `running` was cleared.
    Interrupted,
    /// The source has no more scans.
    EndOfStream,
    /// The source failed.
    SourceFailed(SourceError),
}

/// Drives an estimator from a source into a sink.
pub struct OdometryPipeline {
    estimator: OdometryEstimator,
}

impl OdometryPipeline {
    pub fn new(estimator: OdometryEstimator) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &OdometryEstimator {
        &self.estimator
    }

    pub fn into_estimator(self) -> OdometryEstimator {
        self.estimator
    }

    /// Run until the source stops or `running` is cleared.
    ///
    /// `running` is checked between scans only.
    pub fn run(
        &mut self,
        source: &mut dyn ScanSource,
        sink: &mut dyn PoseSink,
        running: &AtomicBool,
    ) -> (PipelineStats, StopReason) {
        let mut stats = PipelineStats::default();

        let reason = loop {
            if !running.load(Ordering::Relaxed) {
                break StopReason::Interrupted;
            }

            let scan = match source.next_scan() {
                Ok(scan) => scan,
                Err(SourceError::EndOfStream) => break StopReason::EndOfStream,
                Err(e) => break StopReason::SourceFailed(e),
            };

            let update = match self.estimator.process(&scan) {
                Ok(update) => update,
                Err(e) => {
                    log::warn!("Skipping scan @{}: {}", scan.timestamp_us, e);
                    stats.skipped += 1;
                    continue;
                }
            };
            stats.processed += 1;

            if let Err(e) = sink.publish(&scan.data, &update) {
                log::warn!("Failed to publish update @{}: {}", update.timestamp_us, e);
                stats.publish_failures += 1;
            }
        };

        match &reason {
            StopReason::Interrupted => log::info!("Pipeline interrupted"),
            StopReason::EndOfStream => log::info!("Scan stream ended"),
            StopReason::SourceFailed(e) => log::error!("Scan source failed: {}", e),
        }
        if let Err(e) = sink.flush() {
            log::warn!("Failed to flush sink: {}", e);
        }

        log::info!(
            "Pipeline stopped: {} processed, {} skipped, {} publish failures",
            stats.processed,
            stats.skipped,
            stats.publish_failures
        );
        (stats, reason)
    }
}
