//! Diagnostics backends for the tracker binaries.
//!
//! Both backends write to stderr so stdout stays free for JSON results.
//! `init_with_level` installs a plain `log` backend that only prints records
//! coming from the `piv_tracker*` crates. With the `tracing` feature,
//! `init_tracing` installs a `tracing-subscriber` instead, which also reports
//! span timings for the correlation and matching stages.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
pub use tracing_subscriber::util::TryInitError;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Module-path prefix shared by every crate of the workspace.
pub const TARGET_PREFIX: &str = "piv_tracker";

struct StderrLogger {
    level: LevelFilter,
    started: Instant,
}

impl StderrLogger {
    /// `piv_tracker_detector::peak` -> `detector::peak`.
    fn short_target<'a>(target: &'a str) -> &'a str {
        target
            .strip_prefix(TARGET_PREFIX)
            .map(|rest| rest.trim_start_matches(['_', ':']))
            .filter(|rest| !rest.is_empty())
            .unwrap_or(target)
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with(TARGET_PREFIX)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{elapsed:8.3}s {:>5} {}] {}",
            record.level(),
            Self::short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<StderrLogger> = OnceLock::new();

/// Install the stderr `log` backend. Later calls keep the first level.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| StderrLogger {
        level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Output format of [`init_tracing`].
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceFormat {
    /// Human-readable lines with uptime stamps.
    #[default]
    Text,
    /// One JSON object per event, span fields flattened.
    Json,
}

/// Install a `tracing` subscriber on stderr, filtered by `RUST_LOG`
/// (`info` when unset). Closed spans are reported with their busy time.
///
/// `log` records from the library are bridged into the same subscriber, so
/// per-point rejections appear next to the span timings. Fails if a global
/// subscriber or logger is already installed.
#[cfg(feature = "tracing")]
pub fn init_tracing(format: TraceFormat) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    match format {
        TraceFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        TraceFormat::Text => builder
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init(),
    }
}
