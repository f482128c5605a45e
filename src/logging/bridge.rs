//! `tracing` layer that forwards events into a [`Logger`].
//!
//! Installing [`LogBridgeLayer`] in a `tracing_subscriber` registry sends the
//! crate's own diagnostics (rotation notices, maintenance failures) and any
//! host `tracing` events through the same output as structured records.
//!
//! Events with the write-failure target are skipped so a failing output
//! cannot report into itself.

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::logging::event::{FieldValue, Fields, Level, LogEvent};
use crate::logging::logger::{Logger, WRITE_FAILURE_TARGET};

/// Layer writing `tracing` events through a [`Logger`].
#[derive(Debug, Clone)]
pub struct LogBridgeLayer {
    logger: Logger,
}

impl LogBridgeLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LogBridgeLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if metadata.target() == WRITE_FAILURE_TARGET {
            return;
        }

        let level = Level::from(*metadata.level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut record = LogEvent::new(level, visitor.message.unwrap_or_default());
        record.fields = visitor.fields;
        record
            .fields
            .insert("target".to_string(), metadata.target().into());
        if self.logger.caller_info() {
            if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
                record.caller = Some(format!("{}:{}", file, line));
            }
        }

        let _ = self.logger.emit(record);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Fields,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: FieldValue) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.into());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string().into());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{:?}", value).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracing_subscriber::layer::SubscriberExt;

    use crate::logging::writer::BufferWriter;

    fn bridged(level: Level) -> (BufferWriter, impl Subscriber + Send + Sync) {
        let buf = BufferWriter::new();
        let logger = Logger::new(Arc::new(buf.clone()), level);
        let subscriber = tracing_subscriber::registry().with(LogBridgeLayer::new(logger));
        (buf, subscriber)
    }

    #[test]
    fn test_forwards_message_and_fields() {
        let (buf, subscriber) = bridged(Level::Debug);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(path = "app-2024-01-01.log", removed = 3u64, "Rotated log file");
        });

        let lines = buf.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "Rotated log file");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["path"], "app-2024-01-01.log");
        assert_eq!(lines[0]["removed"], 3);
        assert!(lines[0]["target"].as_str().is_some());
    }

    #[test]
    fn test_respects_logger_level() {
        let (buf, subscriber) = bridged(Level::Warn);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("quiet");
            tracing::warn!("loud");
        });

        let lines = buf.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "loud");
    }

    #[test]
    fn test_skips_write_failure_target() {
        let (buf, subscriber) = bridged(Level::Trace);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: WRITE_FAILURE_TARGET, "Failed to write log record");
        });

        assert!(buf.lines().is_empty());
    }
}
