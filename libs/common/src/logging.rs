//! Logging setup for Flow Utilities binaries
//!
//! Console output always goes to stderr (stdout carries command results).
//! When a log directory is configured, a daily rolling file is written through
//! a non-blocking worker as well.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;
use crate::{Error, Result};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2025-12-02T00:50:44.809Z [INFO] Flow dispatcher loaded`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.3fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Global guards for keeping file writers alive
static GUARDS: OnceLock<Arc<Mutex<Vec<WorkerGuard>>>> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Application name, used as the log file prefix
    pub app_name: String,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Directory of the rolling log file, console only when `None`
    pub log_dir: Option<PathBuf>,
    /// JSON lines in the log file
    pub enable_json: bool,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "flow".to_string(),
            level: "info".to_string(),
            log_dir: None,
            enable_json: false,
            ansi: true,
        }
    }
}

impl LogConfig {
    pub fn from_logging_config(app_name: impl Into<String>, logging: &LoggingConfig) -> Self {
        Self {
            app_name: app_name.into(),
            level: logging.level.clone(),
            log_dir: logging.dir.clone(),
            enable_json: logging.json,
            ..Default::default()
        }
    }
}

/// Filter directives in effect: `RUST_LOG` when set, `level` otherwise
pub fn filter_directives(level: &str) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env) if !env.trim().is_empty() => env,
        _ => level.to_string(),
    }
}

/// Parse filter directives, rejecting invalid ones instead of ignoring them
pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .map_err(|e| Error::logging(format!("Invalid log filter '{}': {}", directives, e)))
}

/// Initialize logging system with configuration
///
/// Fails when a global subscriber is already installed.
pub fn init_with_config(config: LogConfig) -> Result<()> {
    let directives = filter_directives(&config.level);
    let env_filter = parse_filter(&directives)?;

    let registry = tracing_subscriber::registry().with(env_filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.app_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            // Store guard to prevent dropping
            let guards = GUARDS.get_or_init(|| Arc::new(Mutex::new(Vec::new())));
            match guards.lock() {
                Ok(mut guards) => guards.push(guard),
                Err(poisoned) => poisoned.into_inner().push(guard),
            }

            let layer = if config.enable_json {
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_level(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .boxed()
            };
            Some(layer)
        },
        None => None,
    };

    registry
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::logging(e.to_string()))?;

    tracing::debug!(
        app = %config.app_name,
        filter = %directives,
        log_dir = ?config.log_dir,
        "Logging initialized"
    );

    Ok(())
}
