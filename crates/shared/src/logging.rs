//! Logging infrastructure for the dataset tools.
//!
//! Structured `tracing` output to the console, plus optional daily-rotated
//! log files. Configured once at process entry; nothing here runs on import.

use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming and the filter directive)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            component: "isekai_dataset".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

/// Parse a level name (`trace`, `debug`, `info`, `warn`, `error`).
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim())
        .map_err(|_| anyhow::anyhow!("Unknown log level: {}", level))
}

/// Build the filter directive for a component at the given level.
///
/// HTTP internals are capped at `warn` regardless of the requested level.
pub fn filter_directive(component: &str, level: Level) -> String {
    format!(
        "{}={},shared={},hyper=warn,reqwest=warn,h2=warn",
        component.replace('-', "_"),
        level,
        level
    )
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Console output (human-readable)
/// - Optional daily-rotated file output, text or JSON
/// - Component-scoped filtering; the environment is not consulted
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter_directive(&config.component, config.default_level))
        .context("Failed to build log filter")?;

    let mut layers = Vec::new();

    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stdout)
            .boxed();
        layers.push(console_layer);
    }

    if config.file {
        let log_dir = Path::new(&config.log_dir);
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        level = %config.default_level,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}
