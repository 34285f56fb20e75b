//! Odometry output.
//!
//! Each processed scan is handed to a [`PoseSink`] together with the raw
//! points it came from.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::algorithms::matching::RegistrationSummary;
use crate::core::types::{PointCloud2D, PoseBelief};
use crate::engine::odometry::{OdometryUpdate, UpdatePhase};

/// Publishing errors. These never stop the pipeline.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Consumer of odometry updates.
pub trait PoseSink {
    fn publish(&mut self, raw: &PointCloud2D, update: &OdometryUpdate) -> Result<(), SinkError>;

    /// Flush buffered output. Called once when the pipeline stops.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Logs one line per update at `info`.
#[derive(Debug, Default)]
pub struct LogSink;

impl PoseSink for LogSink {
    fn publish(&mut self, raw: &PointCloud2D, update: &OdometryUpdate) -> Result<(), SinkError> {
        let pose = &update.pose;
        log::info!(
            "[{}] x={:+.4}m y={:+.4}m θ={:+.2}° (σ {:.4}/{:.4}/{:.3}) {} pts {:?}",
            update.timestamp_us,
            pose.x.mean,
            pose.y.mean,
            pose.theta.mean,
            pose.x.std_dev(),
            pose.y.std_dev(),
            pose.theta.std_dev(),
            raw.len(),
            update.phase
        );
        Ok(())
    }
}

/// Wire form of an [`OdometryUpdate`].
#[derive(Debug, Serialize)]
pub struct OdometryMessage<'a> {
    pub timestamp_us: u64,
    pub phase: UpdatePhase,
    pub pose: &'a PoseBelief,
    pub relative: Option<RegistrationSummary>,
    pub absolute: Option<RegistrationSummary>,
    pub raw_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<&'a PointCloud2D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<&'a PointCloud2D>,
}

impl<'a> OdometryMessage<'a> {
    pub fn new(raw: &'a PointCloud2D, update: &'a OdometryUpdate, with_points: bool) -> Self {
        Self {
            timestamp_us: update.timestamp_us,
            phase: update.phase,
            pose: &update.pose,
            relative: update.relative,
            absolute: update.absolute,
            raw_points: raw.len(),
            scan: with_points.then_some(raw),
            matched: with_points.then_some(&update.matched),
        }
    }
}

/// Writes one JSON object per update.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    with_points: bool,
    written: u64,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) an output file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            with_points: false,
            written: 0,
        }
    }

    /// Also serialize the raw and matched point clouds.
    pub fn with_points(mut self, enabled: bool) -> Self {
        self.with_points = enabled;
        self
    }

    /// Messages written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PoseSink for JsonLinesSink<W> {
    fn publish(&mut self, raw: &PointCloud2D, update: &OdometryUpdate) -> Result<(), SinkError> {
        let message = OdometryMessage::new(raw, update, self.with_points);
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Point2D;

    fn update() -> OdometryUpdate {
        OdometryUpdate {
            timestamp_us: 99,
            pose: PoseBelief::origin(0.01, 1.0).unwrap(),
            phase: UpdatePhase::Seeded,
            relative: None,
            absolute: None,
            matched: PointCloud2D::new(),
            anchored: PointCloud2D::new(),
        }
    }

    #[test]
    fn test_json_lines_one_object_per_update() {
        let raw = PointCloud2D::from_points(vec![Point2D::new(1.0, 2.0)]);
        let mut sink = JsonLinesSink::new(Vec::new());

        sink.publish(&raw, &update()).unwrap();
        sink.publish(&raw, &update()).unwrap();
        assert_eq!(sink.written(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["timestamp_us"], 99);
        assert_eq!(value["phase"], "seeded");
        assert_eq!(value["raw_points"], 1);
        assert_eq!(value["pose"]["theta"]["label"], "theta");
        assert!(value["relative"].is_null());
        assert!(value.get("scan").is_none());
    }

    #[test]
    fn test_json_lines_with_points() {
        let raw = PointCloud2D::from_points(vec![Point2D::new(1.0, 2.0)]);
        let mut sink = JsonLinesSink::new(Vec::new()).with_points(true);
        sink.publish(&raw, &update()).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["scan"]["xs"][0], 1.0);
        assert_eq!(value["scan"]["ys"][0], 2.0);
    }

    #[test]
    fn test_log_sink_never_fails() {
        let mut sink = LogSink;
        assert!(sink.publish(&PointCloud2D::new(), &update()).is_ok());
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn test_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odometry.jsonl");

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.publish(&PointCloud2D::new(), &update()).unwrap();
        sink.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
