//! Logging Configuration and Initialization
//!
//! Every DCC component logs through `tracing`. This module wires up the
//! subscriber:
//!
//! - a console layer on stderr (stdout is reserved for command output)
//! - optional per-session log files, opened in append mode:
//!   - `log_dcc_{mode}_debug.txt`: everything at the configured level
//!   - `log_dcc_{mode}_posted.txt`: one `alias<TAB>remote-id` line per created record
//!   - `log_dcc_{mode}_error.txt`: terse error messages
//!
//! Created records are written to the posted log by emitting an event on the
//! [`POSTED_LOG_TARGET`] target:
//!
//! ```rust
//! use dcc_common::logging::POSTED_LOG_TARGET;
//!
//! let (alias, accession) = ("my-lab:rep1", "ENCFF000AAA");
//! tracing::info!(target: POSTED_LOG_TARGET, "{}\t{}", alias, accession);
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dcc_common::logging::{init_logging, LogConfig, LogLevel, SessionLogs};
//! use dcc_common::DccMode;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder()
//!         .level(LogLevel::Debug)
//!         .session(SessionLogs::new("DCC_Logs", DccMode::Dev))
//!         .build();
//!     init_logging(&config)?;
//!
//!     tracing::info!("Application started");
//!     Ok(())
//! }
//! ```

use crate::types::DccMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    filter::{LevelFilter, Targets},
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Target of the events that make up the posted-records log.
pub const POSTED_LOG_TARGET: &str = "dcc::posted";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            other => anyhow::bail!("Invalid LOG_LEVEL '{other}', expected trace, debug, info, warn or error"),
        };
        Ok(level)
    }
}

/// Console log format; the session files are always plain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("Invalid LOG_FORMAT '{other}', expected text or json"),
        }
    }
}

/// Location and naming of the per-session log files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogs {
    /// Directory holding the log files, created on demand
    pub dir: PathBuf,

    /// Portal mode, part of every file name so dev and prod logs never mix
    pub mode: DccMode,
}

impl SessionLogs {
    pub fn new(dir: impl Into<PathBuf>, mode: DccMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    /// File name for one of the session logs (`debug`, `posted`, `error`)
    pub fn file_name(&self, tag: &str) -> String {
        format!("log_dcc_{}_{}.txt", self.mode, tag)
    }

    pub fn path(&self, tag: &str) -> PathBuf {
        self.dir.join(self.file_name(tag))
    }

    fn appender(&self, tag: &str) -> Result<RollingFileAppender> {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(self.file_name(tag))
            .build(&self.dir)
            .with_context(|| format!("Failed to open {} log in {}", tag, self.dir.display()))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Level of the console and the debug session log
    pub level: LogLevel,

    pub format: LogFormat,

    /// Extra filter directives for the console (e.g. "reqwest=warn,dcc_client=debug")
    pub filter_directives: Option<String>,

    /// Source file and line on console lines
    pub include_location: bool,

    pub include_thread_ids: bool,

    /// Event targets on console lines
    pub include_targets: bool,

    /// Per-session log files; console only when unset
    pub session: Option<SessionLogs>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            filter_directives: None,
            include_location: false,
            include_thread_ids: false,
            include_targets: false,
            session: None,
        }
    }
}

impl LogConfig {
    /// Apply environment overrides on top of this configuration
    ///
    /// Reads `LOG_LEVEL`, `LOG_FORMAT`, `LOG_FILTER` and the boolean
    /// `LOG_INCLUDE_LOCATION`, `LOG_INCLUDE_THREAD_IDS`, `LOG_INCLUDE_TARGETS`.
    /// An unparsable boolean keeps the current value.
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Ok(filter) = std::env::var("LOG_FILTER") {
            self.filter_directives = Some(filter);
        }

        self.include_location = env_flag("LOG_INCLUDE_LOCATION", self.include_location);
        self.include_thread_ids = env_flag("LOG_INCLUDE_THREAD_IDS", self.include_thread_ids);
        self.include_targets = env_flag("LOG_INCLUDE_TARGETS", self.include_targets);

        Ok(self)
    }

    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }
}

fn env_flag(name: &str, current: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(current)
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn session(mut self, session: SessionLogs) -> Self {
        self.config.session = Some(session);
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Initialize logging with the given configuration
///
/// Sets the global tracing subscriber, so call it once at startup.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut filter =
        EnvFilter::from_default_env().add_directive(Level::from(config.level).into());

    if let Some(ref directives) = config.filter_directives {
        for directive in directives.split(',') {
            filter = filter.add_directive(
                directive
                    .parse()
                    .context("Failed to parse filter directive")?,
            );
        }
    }

    let mut layers = vec![console_layer(config, filter)];
    if let Some(ref session) = config.session {
        layers.extend(session_layers(config, session)?);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(())
}

fn console_layer(config: &LogConfig, filter: EnvFilter) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.include_targets)
        .with_thread_ids(config.include_thread_ids)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::CLOSE);

    match config.format {
        LogFormat::Text => layer.with_filter(filter).boxed(),
        LogFormat::Json => layer.json().with_filter(filter).boxed(),
    }
}

fn session_layers(config: &LogConfig, session: &SessionLogs) -> Result<Vec<BoxedLayer>> {
    std::fs::create_dir_all(&session.dir).context("Failed to create log directory")?;

    let debug_layer = fmt::layer()
        .with_writer(session.appender("debug")?)
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::from_level(config.level.into()))
        .boxed();

    // Bare "alias<TAB>id" lines after the timestamp
    let posted_layer = fmt::layer()
        .with_writer(session.appender("posted")?)
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .with_filter(Targets::new().with_target(POSTED_LOG_TARGET, Level::INFO))
        .boxed();

    let error_layer = fmt::layer()
        .with_writer(session.appender("error")?)
        .with_ansi(false)
        .with_target(false)
        .with_filter(LevelFilter::ERROR)
        .boxed();

    Ok(vec![debug_layer, posted_layer, error_layer])
}
