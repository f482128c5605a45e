//! Error records built from an [`ErrorContext`].
//!
//! The record level follows the context severity (critical→fatal,
//! high→error, medium→warn, low→info, unset→error). When a monitor is
//! attached, each call tracks the context exactly once after the record is
//! written, whether or not the write succeeded.

use std::sync::Arc;

use crate::context::{classify, ErrorCategory, ErrorContext, ErrorSeverity};
use crate::logging::{FieldValue, Fields, LogType, Logger};
use crate::monitor::ErrorMonitor;

/// Writes error records and feeds the error monitor.
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    logger: Logger,
    monitor: Option<Arc<ErrorMonitor>>,
}

impl ErrorLogger {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            monitor: None,
        }
    }

    /// Track every logged error in `monitor`.
    pub fn with_monitor(mut self, monitor: Arc<ErrorMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn monitor(&self) -> Option<&Arc<ErrorMonitor>> {
        self.monitor.as_ref()
    }

    /// Log `ctx` with an optional underlying error.
    #[track_caller]
    pub fn log_error(&self, ctx: &ErrorContext, err: Option<&dyn std::error::Error>, message: &str) {
        let mut builder = self
            .logger
            .event(ctx.level())
            .log_type(LogType::Error)
            .field("error_category", ctx.category.as_str())
            .opt_field("error_severity", ctx.severity.map(ErrorSeverity::as_str))
            .str_field("request_id", &ctx.request_id)
            .str_field("user_id", &ctx.user_id)
            .str_field("user_email", &ctx.user_email)
            .str_field("component", &ctx.component)
            .str_field("operation", &ctx.operation)
            .str_field("method", &ctx.method)
            .str_field("correlation_id", &ctx.correlation_id)
            .str_field("trace_id", &ctx.trace_id)
            .str_field("span_id", &ctx.span_id)
            .str_field("client_ip", &ctx.client_ip)
            .str_field("user_agent", &ctx.user_agent);

        if ctx.retry_count > 0 || ctx.retryable {
            builder = builder
                .field("retry_count", ctx.retry_count)
                .field("retryable", ctx.retryable);
        }
        if !ctx.details.is_empty() {
            builder = builder.field("details", ctx.details.clone());
        }
        if let Some(err) = err {
            builder = builder.error(err);
        }
        builder.msg(message);

        if let Some(monitor) = &self.monitor {
            monitor.track_error(ctx);
        }
    }

    /// Log `err` with category and severity inferred from its message.
    ///
    /// A severity already set on `ctx` is kept.
    #[track_caller]
    pub fn log_error_classified(&self, ctx: ErrorContext, err: &dyn std::error::Error, message: &str) {
        let (category, severity) = classify(&err.to_string());
        let ctx = ctx.with_category(category).severity_or(severity);
        self.log_error(&ctx, Some(err), message);
    }

    #[track_caller]
    pub fn log_validation_error(&self, ctx: ErrorContext, field: &str, value: &str, reason: &str) {
        let ctx = ctx
            .with_category(ErrorCategory::Validation)
            .severity_or(ErrorSeverity::Low)
            .with_detail("field", field)
            .with_detail("value", value)
            .with_detail("reason", reason);
        self.log_error(&ctx, None, "Validation failed");
    }

    #[track_caller]
    pub fn log_database_error(
        &self,
        ctx: ErrorContext,
        operation: &str,
        table: &str,
        err: &dyn std::error::Error,
    ) {
        let ctx = ctx
            .with_category(ErrorCategory::Database)
            .severity_or(ErrorSeverity::High)
            .with_detail("db_operation", operation)
            .with_detail("table", table);
        self.log_error(&ctx, Some(err), "Database operation failed");
    }

    #[track_caller]
    pub fn log_external_service_error(
        &self,
        ctx: ErrorContext,
        service: &str,
        endpoint: &str,
        status: Option<u16>,
        err: &dyn std::error::Error,
    ) {
        let mut ctx = ctx
            .with_category(ErrorCategory::ExternalService)
            .severity_or(ErrorSeverity::Medium)
            .with_detail("service", service)
            .with_detail("endpoint", endpoint);
        if let Some(status) = status {
            ctx = ctx.with_detail("status", status);
        }
        self.log_error(&ctx, Some(err), "External service call failed");
    }

    #[track_caller]
    pub fn log_authentication_error(&self, ctx: ErrorContext, reason: &str) {
        let ctx = ctx
            .with_category(ErrorCategory::Authentication)
            .severity_or(ErrorSeverity::Medium)
            .with_detail("reason", reason);
        self.log_error(&ctx, None, "Authentication failed");
    }

    /// Log a recovered panic as a critical system error.
    #[track_caller]
    pub fn log_panic(&self, ctx: ErrorContext, payload: &str, backtrace: Option<&str>) {
        let mut details = Fields::new();
        details.insert("panic".into(), FieldValue::from(payload));
        if let Some(backtrace) = backtrace {
            details.insert("backtrace".into(), backtrace.into());
        }
        let ctx = ctx
            .with_category(ErrorCategory::System)
            .with_severity(ErrorSeverity::Critical)
            .with_details(details);
        self.log_error(&ctx, None, "Panic recovered");
    }
}
