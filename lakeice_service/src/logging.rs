/// Structured logging for the lake ice service
///
/// Provides context-rich logging with lake identifiers, timestamps and
/// severity levels. Supports both console output and file-based logging.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::sync::{Mutex, MutexGuard};

use crate::model::DataError;

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
    /// Parses `debug` / `info` / `warn` / `warning` / `error`, any case.
    pub fn parse(name: &str) -> Option<LogLevel> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" => Some(LogLevel::Error),
            _ => None,
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
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Per-lake ice cover time series.
    Timeseries,
    /// Per-lake ice phenology table.
    Phenology,
    /// Lake name lookup table.
    Lookup,
    /// Lake outlines and metadata (GeoJSON).
    Lakes,
    /// Selection and panel coordination.
    Panel,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Timeseries => write!(f, "TS"),
            DataSource::Phenology => write!(f, "LIP"),
            DataSource::Lookup => write!(f, "LUT"),
            DataSource::Lakes => write!(f, "GEO"),
            DataSource::Panel => write!(f, "PANEL"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - many lakes simply have no published series
    Expected,
    /// Unexpected failure - indicates a broken data host or a malformed file
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

fn logger() -> MutexGuard<'static, Option<Logger>> {
    // A panic while holding the lock leaves the logger itself intact.
    LOGGER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger_cfg = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        *logger() = Some(logger_cfg);
    }

    fn format_entry(level: LogLevel, source: DataSource, lake_id: Option<&str>, message: &str) -> String {
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let lake_part = lake_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        format!("{} {} {}{}: {}", timestamp, level, source, lake_part, message)
    }

    /// Log a message with the global logger
    fn log(&self, level: LogLevel, source: DataSource, lake_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = Self::format_entry(level, source, lake_id, message);
        let lake_part = lake_id.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output
        if self.console_timestamps {
            match level {
                LogLevel::Error => eprintln!("{}", log_entry),
                LogLevel::Warning => eprintln!("   {}", log_entry),
                LogLevel::Info => eprintln!("   {}", log_entry),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", log_entry),
            }
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, lake_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, lake_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}{}: {}", source, lake_part, message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

/// Log a general informational message
pub fn info(source: DataSource, lake_id: Option<&str>, message: &str) {
    if let Some(l) = logger().as_ref() {
        l.log(LogLevel::Info, source, lake_id, message);
    }
}

/// Log a warning message
pub fn warn(source: DataSource, lake_id: Option<&str>, message: &str) {
    if let Some(l) = logger().as_ref() {
        l.log(LogLevel::Warning, source, lake_id, message);
    }
}

/// Log an error message
pub fn error(source: DataSource, lake_id: Option<&str>, message: &str) {
    if let Some(l) = logger().as_ref() {
        l.log(LogLevel::Error, source, lake_id, message);
    }
}

/// Log a debug message
pub fn debug(source: DataSource, lake_id: Option<&str>, message: &str) {
    if let Some(l) = logger().as_ref() {
        l.log(LogLevel::Debug, source, lake_id, message);
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a data fetch failure.
///
/// A 404 or a missing local file means the lake has no published product,
/// which is routine. Anything that suggests the host or the file format is
/// broken is unexpected.
pub fn classify_fetch_failure(err: &DataError) -> FailureType {
    match err {
        DataError::HttpError { status: 404, .. } => FailureType::Expected,
        DataError::HttpError { status, .. } if *status >= 500 => FailureType::Unexpected,
        DataError::HttpError { .. } => FailureType::Unknown,
        DataError::Io { kind: ErrorKind::NotFound, .. } => FailureType::Expected,
        DataError::Io { .. } => FailureType::Unknown,
        DataError::NoDataAvailable(_) => FailureType::Expected,
        DataError::RequestFailed { .. } => FailureType::Unexpected,
        DataError::ParseError(_) | DataError::EmptyHeader | DataError::MissingColumn(_) => {
            FailureType::Unexpected
        }
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a data fetch failure with automatic classification
pub fn log_fetch_failure(source: DataSource, lake_id: Option<&str>, operation: &str, err: &DataError) {
    let failure_type = classify_fetch_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(source, lake_id, &message),
        FailureType::Unexpected => error(source, lake_id, &message),
        FailureType::Unknown => warn(source, lake_id, &message),
    }
}

// ---------------------------------------------------------------------------
// Verification Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a verification run
pub fn log_verification_summary(total: usize, complete: usize, failed: usize) {
    let message = format!(
        "Verification complete: {}/{} lakes complete, {} without data",
        complete, total, failed
    );

    if failed == 0 {
        info(DataSource::System, None, &message);
    } else if complete == 0 {
        error(DataSource::System, None, &message);
    } else {
        warn(DataSource::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warning));
        assert_eq!(LogLevel::parse(" debug "), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_failure_classification() {
        let missing = DataError::HttpError {
            url: "/data/phenology/1.csv".to_string(),
            status: 404,
        };
        assert_eq!(classify_fetch_failure(&missing), FailureType::Expected);

        let server = DataError::HttpError {
            url: "/data/phenology/1.csv".to_string(),
            status: 503,
        };
        assert_eq!(classify_fetch_failure(&server), FailureType::Unexpected);

        let malformed = DataError::MissingColumn("lic".to_string());
        assert_eq!(classify_fetch_failure(&malformed), FailureType::Unexpected);

        let forbidden = DataError::HttpError {
            url: "/x".to_string(),
            status: 403,
        };
        assert_eq!(classify_fetch_failure(&forbidden), FailureType::Unknown);
    }

    #[test]
    fn test_missing_local_file_classified_by_kind_not_text() {
        let missing = DataError::Io {
            path: "/srv/lakes/data/timeseries/1.csv".to_string(),
            kind: ErrorKind::NotFound,
            message: "Das System kann die angegebene Datei nicht finden.".to_string(),
        };
        assert_eq!(classify_fetch_failure(&missing), FailureType::Expected);

        let denied = DataError::Io {
            path: "/srv/lakes/data/timeseries/1.csv".to_string(),
            kind: ErrorKind::PermissionDenied,
            message: "No such file or directory".to_string(),
        };
        assert_eq!(classify_fetch_failure(&denied), FailureType::Unknown);
    }

    #[test]
    fn test_entry_format_includes_source_and_lake() {
        let entry = Logger::format_entry(LogLevel::Warning, DataSource::Timeseries, Some("4711"), "oops");
        assert!(entry.contains("WARN TS [4711]: oops"), "got {}", entry);
    }
}
