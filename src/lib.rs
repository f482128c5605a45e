//! Structured logging core: typed records, a daily rotating file sink and
//! error-frequency alerting.

pub mod composer;
pub mod config;
pub mod context;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod monitor;
pub mod observability;
pub mod sink;

pub use composer::{AuditLogger, ErrorLogger, PerformanceLogger};
pub use config::LoggingConfig;
pub use context::{ErrorCategory, ErrorContext, ErrorSeverity};
pub use error::{ConfigError, LoggingError, SinkError};
pub use logging::{Level, Logger, LoggerManager};
pub use monitor::{AlertThreshold, ErrorMonitor};
pub use sink::DailyFileWriter;
