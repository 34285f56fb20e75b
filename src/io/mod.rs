//! I/O layer.
//!
//! # Contents
//!
//! - [`source`]: Scan acquisition trait and JSON-lines replay
//! - [`sink`]: Pose output trait, log and JSON-lines sinks
//! - [`pipeline`]: The synchronous source → estimator → sink loop

pub mod pipeline;
pub mod sink;
pub mod source;

pub use pipeline::{OdometryPipeline, PipelineStats, StopReason};
pub use sink::{JsonLinesSink, LogSink, OdometryMessage, PoseSink, SinkError};
pub use source::{RecordedFrame, RecordedSource, ScanSource, SourceError};
