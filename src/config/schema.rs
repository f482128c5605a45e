//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the logging
//! core. All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::validation::ValidationError;
use crate::logging::{Level, LogFormat};

/// Root configuration for the logging core.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level (trace, debug, info, warn, error, fatal).
    pub level: String,

    /// Line format (json, console).
    pub format: String,

    /// Output destination (console, file, both).
    pub output: String,

    /// Directory holding the daily log files.
    pub directory: PathBuf,

    /// Days to keep rotated files (0 = keep forever).
    pub max_age: u32,

    /// Number of rotated files to keep (0 = unlimited).
    pub max_backups: usize,

    /// Gzip rotated files.
    pub compress: bool,

    /// Name files and stamp records in local time instead of UTC.
    pub local_time: bool,

    /// Attach the `caller` field (file:line) to every record.
    pub caller_info: bool,

    /// Volume sampling.
    pub sampling: SamplingConfig,

    /// Error frequency monitor settings.
    pub monitor: MonitorConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
            output: "console".to_string(),
            directory: PathBuf::from("logs"),
            max_age: 30,
            max_backups: 10,
            compress: true,
            local_time: true,
            caller_info: false,
            sampling: SamplingConfig::default(),
            monitor: MonitorConfig::default(),
        }
    }
}

impl LoggingConfig {
    /// Parsed minimum level.
    pub fn level(&self) -> Result<Level, ValidationError> {
        self.level.parse()
    }

    /// Parsed line format.
    pub fn format(&self) -> Result<LogFormat, ValidationError> {
        self.format.parse()
    }

    /// Parsed output destination.
    pub fn output(&self) -> Result<OutputTarget, ValidationError> {
        self.output.parse()
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Console,
    File,
    Both,
}

impl OutputTarget {
    /// Whether the daily file sink is part of the output set.
    pub fn uses_file(self) -> bool {
        matches!(self, OutputTarget::File | OutputTarget::Both)
    }

    /// Whether stdout is part of the output set.
    pub fn uses_console(self) -> bool {
        matches!(self, OutputTarget::Console | OutputTarget::Both)
    }
}

impl FromStr for OutputTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "console" | "stdout" => Ok(OutputTarget::Console),
            "file" => Ok(OutputTarget::File),
            "both" => Ok(OutputTarget::Both),
            _ => Err(ValidationError::InvalidOutput(s.to_string())),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputTarget::Console => "console",
            OutputTarget::File => "file",
            OutputTarget::Both => "both",
        };
        f.write_str(s)
    }
}

/// Burst-then-rate sampling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Enable sampling.
    pub enabled: bool,

    /// Events let through unconditionally each second.
    pub initial: u32,

    /// After the burst, one of every `thereafter` events is kept.
    pub thereafter: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial: 100,
            thereafter: 100,
        }
    }
}

/// Error frequency monitor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Track error occurrences at all.
    pub enabled: bool,

    /// Frequency records not seen for this long are swept (0 = never).
    pub max_age_secs: u64,

    /// Sweep period in seconds.
    pub cleanup_interval_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_age_secs: 24 * 60 * 60,
            cleanup_interval_secs: 60 * 60,
        }
    }
}

impl MonitorConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
