/// Structured logging for the surf alert service
///
/// Thin layer over `tracing` that tags every event with the component that
/// produced it and, where relevant, the location id. Output goes to stderr
/// or an append-mode log file; stdout belongs to the cycle report.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a config value such as "info" or "WARN". Unrecognized values
    /// fall back to `Info`.
    pub fn parse(value: &str) -> LogLevel {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Evaluator,
    QuietHours,
    State,
    Ingest,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Evaluator => write!(f, "EVAL"),
            Component::QuietHours => write!(f, "QUIET"),
            Component::State => write!(f, "STATE"),
            Component::Ingest => write!(f, "INGEST"),
            Component::Config => write!(f, "CFG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Initialization
// ---------------------------------------------------------------------------

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `min_level` when set. When `log_file` is
/// given, events are appended there without ANSI colours. Calling this twice
/// is an error (the first subscriber stays installed).
pub fn init_logger(
    min_level: LogLevel,
    log_file: Option<&str>,
    console_timestamps: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.directive()));

    let writer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_target(false);

    if console_timestamps || log_file.is_some() {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

pub fn info(component: Component, location_id: Option<&str>, message: &str) {
    tracing::info!(component = %component, location = location_id.unwrap_or("-"), "{}", message);
}

pub fn warn(component: Component, location_id: Option<&str>, message: &str) {
    tracing::warn!(component = %component, location = location_id.unwrap_or("-"), "{}", message);
}

pub fn error(component: Component, location_id: Option<&str>, message: &str) {
    tracing::error!(component = %component, location = location_id.unwrap_or("-"), "{}", message);
}

pub fn debug(component: Component, location_id: Option<&str>, message: &str) {
    tracing::debug!(component = %component, location = location_id.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Cycle Summary Logging
// ---------------------------------------------------------------------------

/// Logs the outcome of one check cycle. Withheld alerts are a warning so
/// they stand out in the log between quiet-hours runs.
pub fn log_cycle_summary(evaluated_days: usize, new_alerts: usize, withheld_alerts: usize) {
    let message = format!(
        "Cycle complete: {} days evaluated, {} new alerts, {} withheld by quiet hours",
        evaluated_days, new_alerts, withheld_alerts
    );

    if withheld_alerts > 0 {
        warn(Component::System, None, &message);
    } else {
        info(Component::System, None, &message);
    }
}
