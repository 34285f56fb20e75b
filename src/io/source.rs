//! Scan acquisition.
//!
//! The estimator pulls scans through [`ScanSource`]. A live LiDAR driver
//! would implement it; [`RecordedSource`] replays JSON-lines recordings.
//!
//! # Recording format
//!
//! One JSON object per line, tagged by `kind`:
//!
//! ```text
//! {"kind":"points","timestamp_us":1000,"points":[{"x":1.0,"y":0.5}, ...]}
//! {"kind":"polar","timestamp_us":2000,"scan":{"angles":[...],"ranges":[...]}}
//! ```
//!
//! Polar frames are range-filtered and converted to Cartesian. Point frames
//! are range-filtered by distance from the sensor. Blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{LaserScan, Point2D, PointCloud2D, Timestamped};
use crate::sensors::preprocessing::{RangeFilter, ScanConverter};

/// Acquisition errors. Any of these ends the processing loop.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed frame on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Sensor disconnected")]
    Disconnected,

    #[error("End of stream")]
    EndOfStream,
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Produces one scan per call, blocking until it is available.
pub trait ScanSource {
    fn next_scan(&mut self) -> Result<Timestamped<PointCloud2D>>;
}

/// One recorded frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordedFrame {
    /// Cartesian points in the sensor frame (meters).
    Points {
        timestamp_us: u64,
        points: Vec<Point2D>,
    },
    /// Raw polar sweep.
    Polar { timestamp_us: u64, scan: LaserScan },
}

impl RecordedFrame {
    pub fn timestamp_us(&self) -> u64 {
        match self {
            Self::Points { timestamp_us, .. } | Self::Polar { timestamp_us, .. } => *timestamp_us,
        }
    }
}

/// Replays a JSON-lines recording.
pub struct RecordedSource<R> {
    reader: R,
    filter: RangeFilter,
    converter: ScanConverter,
    line: usize,
    frames_read: u64,
    buf: String,
}

impl RecordedSource<BufReader<File>> {
    /// Open a recording file with default preprocessing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordedSource<R> {
    /// Replay from any buffered reader with default preprocessing.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            filter: RangeFilter::default(),
            converter: ScanConverter::default(),
            line: 0,
            frames_read: 0,
            buf: String::new(),
        }
    }

    /// Replace the range filter and polar converter.
    pub fn with_preprocessing(mut self, filter: RangeFilter, converter: ScanConverter) -> Self {
        self.filter = filter;
        self.converter = converter;
        self
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next non-blank frame without preprocessing.
    pub fn next_frame(&mut self) -> Result<RecordedFrame> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Err(SourceError::EndOfStream);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            return serde_json::from_str(text).map_err(|source| SourceError::Parse {
                line: self.line,
                source,
            });
        }
    }

    fn to_cloud(&self, frame: RecordedFrame) -> Timestamped<PointCloud2D> {
        match frame {
            RecordedFrame::Points {
                timestamp_us,
                points,
            } => Timestamped::new(
                self.filter.apply_cloud(&PointCloud2D::from_points(points)),
                timestamp_us,
            ),
            RecordedFrame::Polar { timestamp_us, scan } => Timestamped::new(
                self.converter.to_point_cloud(&self.filter.apply(&scan)),
                timestamp_us,
            ),
        }
    }
}

impl<R: BufRead> ScanSource for RecordedSource<R> {
    fn next_scan(&mut self) -> Result<Timestamped<PointCloud2D>> {
        let frame = self.next_frame()?;
        self.frames_read += 1;
        Ok(self.to_cloud(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::{Cursor, Write};

    fn source(text: &str) -> RecordedSource<Cursor<Vec<u8>>> {
        RecordedSource::from_reader(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_points_frame() {
        let mut src = source(
            r#"{"kind":"points","timestamp_us":1000,"points":[{"x":1.0,"y":0.5},{"x":-2.0,"y":0.0}]}"#,
        );

        let scan = src.next_scan().unwrap();
        assert_eq!(scan.timestamp_us, 1000);
        assert_eq!(scan.data.len(), 2);
        assert_relative_eq!(scan.data.xs[1], -2.0);
        assert_eq!(src.frames_read(), 1);
        assert!(matches!(src.next_scan(), Err(SourceError::EndOfStream)));
    }

    #[test]
    fn test_polar_frame_is_filtered_and_converted() {
        let mut src = source(
            r#"{"kind":"polar","timestamp_us":5,"scan":{"angles":[0.0,1.5707964,3.0],"ranges":[1.0,2.0,0.0]}}"#,
        );

        let scan = src.next_scan().unwrap();
        assert_eq!(scan.data.len(), 2); // zero range dropped
        assert_relative_eq!(scan.data.xs[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(scan.data.ys[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_points_at_origin_are_dropped() {
        let mut src = source(
            r#"{"kind":"points","timestamp_us":0,"points":[{"x":0.0,"y":0.0},{"x":1.0,"y":0.0}]}"#,
        );
        assert_eq!(src.next_scan().unwrap().data.len(), 1);
    }

    #[test]
    fn test_blank_lines_skipped_and_line_numbers_reported() {
        let mut src = source(
            "\n{\"kind\":\"points\",\"timestamp_us\":1,\"points\":[]}\n\n   \nnot json\n",
        );

        assert_eq!(src.next_scan().unwrap().timestamp_us, 1);
        match src.next_scan() {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_is_parse_error() {
        let mut src = source(r#"{"kind":"imu","timestamp_us":1}"#);
        assert!(matches!(
            src.next_scan(),
            Err(SourceError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_frame_round_trips_through_json() {
        let frame = RecordedFrame::Points {
            timestamp_us: 42,
            points: vec![Point2D::new(1.0, 2.0)],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""kind":"points""#));

        let mut src = source(&json);
        assert_eq!(src.next_frame().unwrap(), frame);
        assert_eq!(frame.timestamp_us(), 42);
    }

    #[test]
    fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"kind":"points","timestamp_us":7,"points":[{{"x":1.0,"y":1.0}}]}}"#
        )
        .unwrap();

        let mut src = RecordedSource::open(file.path()).unwrap();
        assert_eq!(src.next_scan().unwrap().timestamp_us, 7);
        assert!(matches!(src.next_scan(), Err(SourceError::EndOfStream)));
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        assert!(matches!(
            RecordedSource::open("/nonexistent/gati/replay.jsonl"),
            Err(SourceError::Io(_))
        ));
    }
}
