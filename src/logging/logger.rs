//! Scoped structured logger.
//!
//! A [`Logger`] is a cheap handle onto a shared core (writer, level, sampler,
//! format) plus a set of context fields. The `with_*` methods return a new
//! handle carrying extra context and never touch the original, so one base
//! logger can be reused concurrently across requests.

use std::io;
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::SamplingConfig;
use crate::logging::event::{FieldValue, Fields, Level, LogEvent, LogType};
use crate::logging::format::{self, LogFormat};
use crate::logging::sampling::Sampler;
use crate::logging::writer::LogWriter;
use crate::observability::metrics;

/// `tracing` target used when a record cannot be written. The bridge layer
/// ignores it so a failing output cannot feed back into itself.
pub(crate) const WRITE_FAILURE_TARGET: &str = "logcore::write_failure";

/// Settings shared by every logger derived from one core.
#[derive(Debug, Clone)]
pub struct LoggerSettings {
    pub level: Level,
    pub format: LogFormat,
    pub local_time: bool,
    pub caller_info: bool,
    pub sampling: SamplingConfig,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: LogFormat::Json,
            local_time: false,
            caller_info: false,
            sampling: SamplingConfig::default(),
        }
    }
}

struct LoggerCore {
    writer: Arc<dyn LogWriter>,
    min_level: AtomicU8,
    sampler: Option<Sampler>,
    format: LogFormat,
    local_time: bool,
    caller_info: bool,
}

/// Structured logger handle.
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    context: Arc<Fields>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("context", &self.context)
            .finish()
    }
}

impl Logger {
    /// JSON logger in UTC without sampling.
    pub fn new(writer: Arc<dyn LogWriter>, level: Level) -> Self {
        Self::with_settings(
            writer,
            LoggerSettings {
                level,
                ..Default::default()
            },
        )
    }

    pub fn with_settings(writer: Arc<dyn LogWriter>, settings: LoggerSettings) -> Self {
        let core = LoggerCore {
            writer,
            min_level: AtomicU8::new(settings.level as u8),
            sampler: Sampler::from_config(&settings.sampling),
            format: settings.format,
            local_time: settings.local_time,
            caller_info: settings.caller_info,
        };
        Self {
            core: Arc::new(core),
            context: Arc::new(Fields::new()),
        }
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        Level::from(self.core.min_level.load(Ordering::Relaxed))
    }

    /// Change the minimum level for this logger and every logger sharing its core.
    pub fn set_level(&self, level: Level) {
        self.core.min_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    pub(crate) fn caller_info(&self) -> bool {
        self.core.caller_info
    }

    /// Context fields attached to every record.
    pub fn context(&self) -> &Fields {
        &self.context
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> Logger {
        let mut context = (*self.context).clone();
        context.insert(key.into(), value.into());
        Logger {
            core: Arc::clone(&self.core),
            context: Arc::new(context),
        }
    }

    pub fn with_fields(&self, fields: Fields) -> Logger {
        let mut context = (*self.context).clone();
        context.extend(fields);
        Logger {
            core: Arc::clone(&self.core),
            context: Arc::new(context),
        }
    }

    pub fn with_request_id(&self, request_id: impl Into<String>) -> Logger {
        self.with_field("request_id", request_id.into())
    }

    /// Scope to a freshly generated request id.
    pub fn with_new_request_id(&self) -> Logger {
        self.with_request_id(uuid::Uuid::new_v4().to_string())
    }

    /// Scope to a user; an empty email is left out.
    pub fn with_user(&self, user_id: impl Into<String>, email: &str) -> Logger {
        let user_id: String = user_id.into();
        let mut fields = Fields::new();
        fields.insert("user_id".into(), user_id.into());
        if !email.is_empty() {
            fields.insert("user_email".into(), email.into());
        }
        self.with_fields(fields)
    }

    pub fn with_component(&self, component: impl Into<String>) -> Logger {
        self.with_field("component", component.into())
    }

    pub fn with_operation(&self, operation: impl Into<String>) -> Logger {
        self.with_field("operation", operation.into())
    }

    /// Start building a record at `level`.
    #[track_caller]
    pub fn event(&self, level: Level) -> EventBuilder<'_> {
        let loc = Location::caller();
        let event = self.enabled(level).then(|| {
            let mut event = LogEvent::new(level, String::new());
            if self.core.caller_info {
                event.caller = Some(format!("{}:{}", loc.file(), loc.line()));
            }
            event
        });
        EventBuilder {
            logger: self,
            event,
        }
    }

    #[track_caller]
    pub fn trace(&self) -> EventBuilder<'_> {
        self.event(Level::Trace)
    }

    #[track_caller]
    pub fn debug(&self) -> EventBuilder<'_> {
        self.event(Level::Debug)
    }

    #[track_caller]
    pub fn info(&self) -> EventBuilder<'_> {
        self.event(Level::Info)
    }

    #[track_caller]
    pub fn warn(&self) -> EventBuilder<'_> {
        self.event(Level::Warn)
    }

    #[track_caller]
    pub fn error(&self) -> EventBuilder<'_> {
        self.event(Level::Error)
    }

    /// Fatal-level record. Does not terminate the process.
    #[track_caller]
    pub fn fatal(&self) -> EventBuilder<'_> {
        self.event(Level::Fatal)
    }

    /// Filter, sample, encode and write a fully built record.
    ///
    /// Context fields are merged underneath the record's own fields. Dropped
    /// records return `Ok`; write failures are counted, reported through
    /// `tracing` and returned.
    pub fn emit(&self, mut event: LogEvent) -> io::Result<()> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        if let Some(sampler) = &self.core.sampler {
            if !sampler.sample(event.level, &event.message) {
                metrics::record_event_dropped("sampled");
                return Ok(());
            }
        }

        for (key, value) in self.context.iter() {
            event
                .fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        let line = format::encode(&event, self.core.format, self.core.local_time);
        match self.core.writer.write_line(&line) {
            Ok(_) => {
                metrics::record_event_written(event.level.as_str());
                Ok(())
            }
            Err(e) => {
                metrics::record_write_error();
                tracing::warn!(
                    target: WRITE_FAILURE_TARGET,
                    error = %e,
                    level = %event.level,
                    "Failed to write log record"
                );
                Err(e)
            }
        }
    }

    /// Zero-byte write through the output, confirming it accepts data.
    pub fn probe(&self) -> io::Result<()> {
        self.core.writer.write_line(&[]).map(|_| ())
    }
}

/// Builder for one record. Nothing is written until [`EventBuilder::msg`].
///
/// When the level is disabled every method is a cheap no-op.
#[must_use = "call `msg` to emit the record"]
pub struct EventBuilder<'a> {
    logger: &'a Logger,
    event: Option<LogEvent>,
}

impl<'a> EventBuilder<'a> {
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.fields.insert(key.into(), value.into());
        }
        self
    }

    /// Add the field only when a value is present.
    pub fn opt_field<V: Into<FieldValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    /// Add a string field unless it is empty.
    pub fn str_field(self, key: impl Into<String>, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.field(key, value)
        }
    }

    pub fn fields(mut self, fields: Fields) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.fields.extend(fields);
        }
        self
    }

    /// Duration in milliseconds.
    pub fn duration(self, key: impl Into<String>, duration: Duration) -> Self {
        self.field(key, FieldValue::millis(duration))
    }

    /// Attach an error's message under `error`.
    pub fn error(self, err: &dyn std::error::Error) -> Self {
        self.field("error", err.to_string())
    }

    pub fn log_type(mut self, log_type: LogType) -> Self {
        if let Some(event) = self.event.as_mut() {
            event.log_type = Some(log_type);
        }
        self
    }

    /// Set the message and write the record.
    pub fn msg(self, message: impl Into<String>) {
        let _ = self.send(message);
    }

    /// Like [`EventBuilder::msg`] but reports the write result.
    pub fn send(self, message: impl Into<String>) -> io::Result<()> {
        match self.event {
            Some(mut event) => {
                event.message = message.into();
                self.logger.emit(event)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::writer::BufferWriter;

    fn buffer_logger(level: Level) -> (Logger, BufferWriter) {
        let buf = BufferWriter::new();
        (Logger::new(Arc::new(buf.clone()), level), buf)
    }

    #[test]
    fn test_level_filter() {
        let (logger, buf) = buffer_logger(Level::Info);
        logger.debug().field("k", 1).msg("hidden");
        logger.info().msg("shown");

        let lines = buf.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "shown");
    }

    #[test]
    fn test_runtime_level_change_is_shared() {
        let (logger, buf) = buffer_logger(Level::Warn);
        let scoped = logger.with_component("ledger");

        scoped.info().msg("dropped");
        logger.set_level(Level::Debug);
        scoped.info().msg("kept");

        assert_eq!(scoped.level(), Level::Debug);
        assert_eq!(buf.json_lines().len(), 1);
    }

    #[test]
    fn test_scoped_logger_does_not_mutate_parent() {
        let (base, buf) = buffer_logger(Level::Info);
        let scoped = base
            .with_request_id("req-1")
            .with_user("u-42", "a@example.com")
            .with_operation("transfer");

        scoped.info().msg("scoped");
        base.info().msg("base");

        let lines = buf.json_lines();
        assert_eq!(lines[0]["request_id"], "req-1");
        assert_eq!(lines[0]["user_id"], "u-42");
        assert_eq!(lines[0]["user_email"], "a@example.com");
        assert_eq!(lines[0]["operation"], "transfer");
        assert!(lines[1].get("request_id").is_none());
        assert!(base.context().is_empty());
    }

    #[test]
    fn test_event_fields_override_context() {
        let (base, buf) = buffer_logger(Level::Info);
        base.with_component("api")
            .info()
            .field("component", "worker")
            .msg("override");

        assert_eq!(buf.json_lines()[0]["component"], "worker");
    }

    #[test]
    fn test_new_request_id_is_uuid() {
        let (base, _) = buffer_logger(Level::Info);
        let scoped = base.with_new_request_id();
        let id = scoped.context()["request_id"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_caller_info() {
        let buf = BufferWriter::new();
        let logger = Logger::with_settings(
            Arc::new(buf.clone()),
            LoggerSettings {
                caller_info: true,
                ..Default::default()
            },
        );
        logger.info().msg("where");

        let caller = buf.json_lines()[0]["caller"].as_str().unwrap().to_string();
        assert!(caller.contains("logger.rs:"), "caller was {}", caller);
    }

    #[test]
    fn test_builder_helpers() {
        let (logger, buf) = buffer_logger(Level::Info);
        let err = io::Error::new(io::ErrorKind::NotFound, "missing row");
        logger
            .error()
            .log_type(LogType::Error)
            .str_field("empty", "")
            .opt_field("retries", Some(3u32))
            .opt_field::<u32>("absent", None)
            .duration("duration_ms", Duration::from_millis(250))
            .error(&err)
            .msg("failed");

        let line = &buf.json_lines()[0];
        assert_eq!(line["log_type"], "error");
        assert_eq!(line["retries"], 3);
        assert_eq!(line["duration_ms"], 250.0);
        assert_eq!(line["error"], "missing row");
        assert!(line.get("empty").is_none());
        assert!(line.get("absent").is_none());
    }
}
