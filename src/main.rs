//! Gati - LiDAR odometry daemon
//!
//! Replays a recorded scan stream through the odometry estimator and
//! publishes one pose update per scan.
//!
//! # Usage
//!
//! ```bash
//! # Log poses from a recording
//! cargo run --release -- --replay scans.jsonl
//!
//! # Custom config, JSON-lines output
//! cargo run --release -- --config gati.toml --replay scans.jsonl --output poses.jsonl
//! ```

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use serde::Deserialize;

use gati::engine::odometry::{OdometryConfig, OdometryEstimator};
use gati::io::{JsonLinesSink, LogSink, OdometryPipeline, PoseSink, RecordedSource, StopReason};
use gati::sensors::preprocessing::{
    RangeFilter, RangeFilterConfig, ScanConverter, ScanConverterConfig,
};

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "gati", version, about = "2D LiDAR scan-matching odometry")]
struct Args {
    /// Configuration file (default: gati.toml, then /etc/gati.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines scan recording to replay
    #[arg(short, long)]
    replay: PathBuf,

    /// Write updates as JSON lines to this file instead of the log
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Config {
    /// `[memory]`, `[relative]`, `[anchor]`, `[motion_gate]`, `[noise]`,
    /// `[adaptive]`, `[initial]` and `[matcher]` sections
    #[serde(flatten)]
    odometry: OdometryConfig,
    range_filter: RangeFilterConfig,
    converter: ScanConverterConfig,
    output: OutputConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfig {
    /// Include raw and matched points in JSON-lines output
    include_points: bool,
}

fn load_config(args: &Args) -> Config {
    match &args.config {
        Some(path) => match fs::read_to_string(path) {
            Ok(contents) => match basic_toml::from_str(&contents) {
                Ok(cfg) => {
                    log::info!("Loaded config from {}", path.display());
                    cfg
                }
                Err(e) => {
                    log::warn!("Failed to parse config {}: {}", path.display(), e);
                    Config::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {}: {}", path.display(), e);
                Config::default()
            }
        },
        None => {
            // Try default paths
            for path in &["gati.toml", "/etc/gati.toml"] {
                if let Ok(contents) = fs::read_to_string(path)
                    && let Ok(cfg) = basic_toml::from_str(&contents)
                {
                    log::info!("Loaded config from {}", path);
                    return cfg;
                }
            }
            Config::default()
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();
    let config = load_config(&args);

    log::info!("gati starting");
    log::info!("  Replay: {}", args.replay.display());
    match &args.output {
        Some(path) => log::info!("  Output: {}", path.display()),
        None => log::info!("  Output: log"),
    }
    log::info!(
        "  Memory: {} scans, gate {:.3}m / {:.1}°",
        config.odometry.memory.capacity,
        config.odometry.motion_gate.min_translation,
        config.odometry.motion_gate.min_rotation_deg
    );

    // Setup signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");

    if let Err(e) = run(&args, &config, &running) {
        log::error!("Odometry error: {}", e);
        std::process::exit(1);
    }

    log::info!("gati shutdown complete");
}

fn run(
    args: &Args,
    config: &Config,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error>> {
    let estimator = OdometryEstimator::new(config.odometry.clone())?;
    let mut source = RecordedSource::open(&args.replay)?.with_preprocessing(
        RangeFilter::new(config.range_filter),
        ScanConverter::new(config.converter),
    );

    let mut sink: Box<dyn PoseSink> = match &args.output {
        Some(path) => {
            Box::new(JsonLinesSink::create(path)?.with_points(config.output.include_points))
        }
        None => Box::new(LogSink),
    };

    let mut pipeline = OdometryPipeline::new(estimator);
    let (stats, reason) = pipeline.run(&mut source, sink.as_mut(), running);

    let pose = pipeline.estimator().pose();
    log::info!(
        "Final pose: x={:+.4}m y={:+.4}m θ={:+.2}° after {} scans ({} skipped)",
        pose.x.mean,
        pose.y.mean,
        pose.theta.mean,
        stats.processed,
        stats.skipped
    );

    match reason {
        StopReason::SourceFailed(e) => Err(e.into()),
        StopReason::EndOfStream | StopReason::Interrupted => Ok(()),
    }
}
