use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use piv_tracker::detector::{ConfigError, TrackError};
use piv_tracker::io::{load_gray, ImageSequence, IoError};
use piv_tracker::{
    DetectorParams, PatternDetector, PixelPoint, Tracker, TrackerParams, Trajectory,
};

#[derive(Parser, Debug)]
#[command(name = "piv-tracker", version, about = "Track points between video frames")]
struct Cli {
    /// Log level for stderr output (off, error, warn, info, debug, trace).
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    /// Report span timings through `tracing` instead of the plain logger.
    /// Filtered by `RUST_LOG`; `--log-level` is ignored.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true, value_enum)]
    trace: Option<TraceOutput>,

    #[command(subcommand)]
    command: Command,
}

#[cfg(feature = "tracing")]
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum TraceOutput {
    Text,
    Json,
}

#[cfg(feature = "tracing")]
impl From<TraceOutput> for piv_tracker::core::TraceFormat {
    fn from(out: TraceOutput) -> Self {
        match out {
            TraceOutput::Text => Self::Text,
            TraceOutput::Json => Self::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find one point of frame A in frame B.
    Detect {
        #[arg(long)]
        frame_a: PathBuf,
        #[arg(long)]
        frame_b: PathBuf,
        /// Point in frame A as `X,Y`.
        #[arg(long, value_parser = parse_point)]
        point: PixelPoint,
        /// Detector parameters as JSON; defaults when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Track seed points through a sequence of frames described by a JSON job.
    Track {
        #[arg(long)]
        config: PathBuf,
        /// Output file for the trajectories; stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("frames differ in size ({a_width}x{a_height} vs {b_width}x{b_height})")]
    FrameSizeMismatch {
        a_width: usize,
        a_height: usize,
        b_width: usize,
        b_height: usize,
    },
    #[error(transparent)]
    Io(#[from] IoError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
    #[cfg(feature = "tracing")]
    #[error(transparent)]
    Tracing(#[from] piv_tracker::core::TryInitError),
}

fn default_fps() -> f64 {
    30.0
}

/// Tracking job read by `track --config`.
#[derive(Debug, Deserialize)]
struct TrackJob {
    /// Frame image files; relative paths resolve against the job file.
    frames: Vec<PathBuf>,
    #[serde(default = "default_fps")]
    fps: f64,
    seeds: Vec<PixelPoint>,
    #[serde(default)]
    start: usize,
    /// Last frame index (inclusive); the last frame when omitted.
    #[serde(default)]
    end: Option<usize>,
    #[serde(default)]
    detector: DetectorParams,
    #[serde(default)]
    tracker: TrackerParams,
}

#[derive(Debug, Serialize)]
struct DetectReport {
    point: Option<PixelPoint>,
}

#[derive(Debug, Serialize)]
struct TrackReport {
    fps: f64,
    trajectories: Vec<Trajectory>,
}

fn parse_point(s: &str) -> Result<PixelPoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x = x.trim().parse::<i32>().map_err(|e| format!("bad x: {e}"))?;
    let y = y.trim().parse::<i32>().map_err(|e| format!("bad y: {e}"))?;
    Ok(PixelPoint::new(x, y))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, text + "\n")?,
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}")?;
        }
    }
    Ok(())
}

fn run_detect(
    frame_a: &Path,
    frame_b: &Path,
    point: PixelPoint,
    config: Option<&Path>,
) -> Result<(), CliError> {
    let params = match config {
        Some(path) => read_json(path)?,
        None => DetectorParams::default(),
    };
    let detector = PatternDetector::new(params)?;

    let a = load_gray(frame_a)?;
    let b = load_gray(frame_b)?;
    if a.dimensions() != b.dimensions() {
        return Err(CliError::FrameSizeMismatch {
            a_width: a.width,
            a_height: a.height,
            b_width: b.width,
            b_height: b.height,
        });
    }

    let found = detector.detect(&a.view(), &b.view(), point);
    write_json(&DetectReport { point: found }, None)
}

fn run_track(config: &Path, out: Option<&Path>) -> Result<(), CliError> {
    let job: TrackJob = read_json(config)?;
    let base = config.parent().unwrap_or_else(|| Path::new("."));
    let frames: Vec<PathBuf> = job
        .frames
        .iter()
        .map(|p| if p.is_relative() { base.join(p) } else { p.clone() })
        .collect();

    let source = ImageSequence::new(frames, job.fps)?;
    let end = job
        .end
        .unwrap_or_else(|| source.paths().len().saturating_sub(1));

    let detector = PatternDetector::new(job.detector)?;
    let tracker = Tracker::new(detector, job.tracker)?;
    log::info!(
        "tracking {} seeds over frames {}..={}",
        job.seeds.len(),
        job.start,
        end
    );
    let trajectories = tracker.track(&source, job.start, end, &job.seeds)?;

    write_json(
        &TrackReport {
            fps: job.fps,
            trajectories,
        },
        out,
    )
}

fn init_diagnostics(cli: &Cli) -> Result<(), CliError> {
    #[cfg(feature = "tracing")]
    {
        if let Some(out) = cli.trace {
            piv_tracker::core::init_tracing(out.into())?;
            return Ok(());
        }
    }
    piv_tracker::core::init_with_level(cli.log_level)?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    init_diagnostics(&cli)?;
    match cli.command {
        Command::Detect {
            frame_a,
            frame_b,
            point,
            config,
        } => run_detect(&frame_a, &frame_b, point, config.as_deref()),
        Command::Track { config, out } => run_track(&config, out.as_deref()),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
