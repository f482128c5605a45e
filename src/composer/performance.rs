//! Performance measurement records.
//!
//! Every record carries `log_type=performance`; durations are written in
//! milliseconds under `duration_ms`.

use std::time::{Duration, Instant};

use crate::logging::{EventBuilder, FieldValue, Fields, Level, LogType, Logger};

const DEFAULT_SLOW_QUERY: Duration = Duration::from_millis(100);

/// Writes performance records through a [`Logger`].
#[derive(Debug, Clone)]
pub struct PerformanceLogger {
    logger: Logger,
    slow_query: Duration,
}

impl PerformanceLogger {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            slow_query: DEFAULT_SLOW_QUERY,
        }
    }

    /// Queries slower than `threshold` are logged at warn.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query = threshold;
        self
    }

    #[track_caller]
    fn record(&self, level: Level, duration: Duration) -> EventBuilder<'_> {
        self.logger
            .event(level)
            .log_type(LogType::Performance)
            .duration("duration_ms", duration)
    }

    /// Server errors log at error, client errors at warn, the rest at info.
    #[track_caller]
    pub fn log_http_request(
        &self,
        method: &str,
        path: &str,
        status: u16,
        duration: Duration,
        response_size: u64,
    ) {
        let level = match status {
            500.. => Level::Error,
            400..=499 => Level::Warn,
            _ => Level::Info,
        };
        self.record(level, duration)
            .field("method", method)
            .field("path", path)
            .field("status", status)
            .field("response_size", response_size)
            .msg("HTTP request");
    }

    #[track_caller]
    pub fn log_database_query(&self, operation: &str, table: &str, duration: Duration, rows: u64) {
        let slow = duration > self.slow_query;
        let level = if slow { Level::Warn } else { Level::Debug };
        self.record(level, duration)
            .field("operation", operation)
            .field("table", table)
            .field("rows", rows)
            .field("slow", slow)
            .msg("Database query");
    }

    #[track_caller]
    pub fn log_slow_operation(&self, operation: &str, duration: Duration, threshold: Duration) {
        self.record(Level::Warn, duration)
            .field("operation", operation)
            .duration("threshold_ms", threshold)
            .duration("exceeded_by_ms", duration.saturating_sub(threshold))
            .msg("Slow operation");
    }

    #[track_caller]
    pub fn log_external_call(
        &self,
        service: &str,
        endpoint: &str,
        duration: Duration,
        status: u16,
        success: bool,
    ) {
        let level = if success { Level::Info } else { Level::Warn };
        self.record(level, duration)
            .field("service", service)
            .field("endpoint", endpoint)
            .field("status", status)
            .field("success", success)
            .msg("External service call");
    }

    #[track_caller]
    pub fn log_cache_operation(&self, operation: &str, key: &str, hit: bool, duration: Duration) {
        self.record(Level::Debug, duration)
            .field("operation", operation)
            .field("key", key)
            .field("hit", hit)
            .msg("Cache operation");
    }

    #[track_caller]
    pub fn log_background_job(
        &self,
        job: &str,
        duration: Duration,
        processed: u64,
        success: bool,
    ) {
        let level = if success { Level::Info } else { Level::Error };
        self.record(level, duration)
            .field("job", job)
            .field("processed", processed)
            .field("success", success)
            .msg("Background job");
    }

    #[track_caller]
    pub fn log_operation_timing(&self, operation: &str, duration: Duration, fields: Fields) {
        self.record(Level::Info, duration)
            .fields(fields)
            .field("operation", operation)
            .msg("Operation timing");
    }

    /// Start timing `operation`. The record is written by [`Timer::finish`],
    /// or when the timer is dropped unfinished.
    pub fn start_timer(&self, operation: impl Into<String>) -> Timer {
        Timer {
            logger: self.clone(),
            operation: operation.into(),
            started: Instant::now(),
            finished: false,
        }
    }
}

/// Running measurement of one operation.
#[must_use = "dropping the timer immediately logs a zero-length operation"]
#[derive(Debug)]
pub struct Timer {
    logger: PerformanceLogger,
    operation: String,
    started: Instant,
    finished: bool,
}

impl Timer {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the elapsed time and return it.
    #[track_caller]
    pub fn finish(self) -> Duration {
        self.finish_with(Fields::new())
    }

    #[track_caller]
    pub fn finish_with(mut self, fields: Fields) -> Duration {
        let elapsed = self.elapsed();
        self.finished = true;
        self.logger.log_operation_timing(&self.operation, elapsed, fields);
        elapsed
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if !self.finished {
            let mut fields = Fields::new();
            fields.insert("finished".into(), FieldValue::from(false));
            self.logger
                .log_operation_timing(&self.operation, self.elapsed(), fields);
        }
    }
}
