//! Logging setup on top of `tracing` and `tracing-subscriber`.
//!
//! Every crate of the workspace emits through `tracing`; the binary installs
//! a single subscriber here.
//!
//! # Log Levels
//!
//! - `error`: fatal input or output problems
//! - `warn`: degraded catalogue lookups, rejected sync batches
//! - `info`: loaded files, per-record merge counts, backfilled vocabulary
//! - `debug`: dropped materials, queued missing references
//! - `trace`: unused
//!
//! Contact details are personal data. They only reach the log when
//! `--log-data` is given; otherwise [`redact_value`] replaces them.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder logged instead of personal values.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Crates whose events follow the configured level.
const WORKSPACE_TARGETS: &[&str] = &[
    "bbdir",
    "bbdir_cli",
    "bbdir_ingest",
    "bbdir_model",
    "bbdir_normalize",
    "bbdir_reconcile",
    "bbdir_standards",
    "bbdir_sync",
];

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Relaxed)
}

/// Returns the input value when data logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace the level filter when it is set.
    pub use_env_filter: bool,
    pub with_timestamps: bool,
    /// Include the module path of each event.
    pub with_target: bool,
    pub with_spans: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
    /// Whether personal values may be logged.
    pub log_data: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_timestamps: false,
            with_target: false,
            with_spans: true,
            with_ansi: true,
            format: LogFormat::default(),
            log_file: None,
            log_data: false,
        }
    }
}

/// Install the global subscriber. Call once at startup.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    if let Some(path) = &config.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        init_logging_with_writer(config, SharedFileWriter::new(file));
    } else {
        init_logging_with_writer(config, io::stderr);
    }
    Ok(())
}

pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Clone + Send + Sync + 'static,
{
    LOG_DATA_ENABLED.store(config.log_data, Ordering::Release);
    let registry = tracing_subscriber::registry()
        .with(build_env_filter(config.level_filter, config.use_env_filter));
    let timed = config.with_timestamps;

    match config.format {
        LogFormat::Json => {
            let span_events = if config.with_spans {
                FmtSpan::CLOSE
            } else {
                FmtSpan::NONE
            };
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(writer)
                        .with_target(config.with_target)
                        .with_span_events(span_events),
                )
                .init();
        }
        // Exactly one of each pair of optional layers is installed.
        LogFormat::Compact => {
            let timed_layer = timed.then(|| {
                fmt::layer()
                    .compact()
                    .with_writer(writer.clone())
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
            });
            let plain_layer = (!timed).then(|| {
                fmt::layer()
                    .compact()
                    .with_writer(writer.clone())
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .without_time()
            });
            registry.with(timed_layer).with(plain_layer).init();
        }
        LogFormat::Pretty => {
            let timed_layer = timed.then(|| {
                fmt::layer()
                    .with_writer(writer.clone())
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
            });
            let plain_layer = (!timed).then(|| {
                fmt::layer()
                    .with_writer(writer.clone())
                    .with_ansi(config.with_ansi)
                    .with_target(config.with_target)
                    .without_time()
            });
            registry.with(timed_layer).with(plain_layer).init();
        }
    }
}

#[derive(Clone)]
struct SharedFileWriter {
    file: Arc<Mutex<std::fs::File>>,
}

impl SharedFileWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
        }
    }
}

struct SharedFileGuard {
    file: Arc<Mutex<std::fs::File>>,
}

impl Write for SharedFileGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFileWriter {
    type Writer = SharedFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedFileGuard {
            file: Arc::clone(&self.file),
        }
    }
}

fn build_env_filter(level: LevelFilter, use_env_filter: bool) -> EnvFilter {
    if use_env_filter && let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::new(filter_directives(level))
}

/// Workspace crates at `level`, everything else at warn.
fn filter_directives(level: LevelFilter) -> String {
    let mut directives = vec![LevelFilter::WARN.min(level).to_string()];
    directives.extend(
        WORKSPACE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}")),
    );
    directives.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_crates_stay_at_warn() {
        let directives = filter_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,bbdir=debug,"), "{directives}");
        assert!(directives.contains("bbdir_reconcile=debug"));
    }

    #[test]
    fn quiet_levels_also_quiet_external_crates() {
        let directives = filter_directives(LevelFilter::ERROR);
        assert!(directives.starts_with("error,"), "{directives}");
    }
}
