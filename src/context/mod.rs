//! Structured error context supplied by callers.
//!
//! An [`ErrorContext`] describes one failure: who hit it, where, how bad it
//! is and how to correlate it. The `with_*` methods consume and return the
//! context, so partially filled contexts can be shared by cloning and
//! specialised per call without shared mutation.

pub mod classify;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logging::{FieldValue, Fields, Level};

pub use classify::{classify, classify_message, severity_for};

/// Category an application error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "business_logic_error")]
    BusinessLogic,
    #[default]
    #[serde(rename = "system_error")]
    System,
    #[serde(rename = "authentication_error")]
    Authentication,
    #[serde(rename = "external_service_error")]
    ExternalService,
    #[serde(rename = "database_error")]
    Database,
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "configuration_error")]
    Configuration,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 8] = [
        ErrorCategory::Validation,
        ErrorCategory::BusinessLogic,
        ErrorCategory::System,
        ErrorCategory::Authentication,
        ErrorCategory::ExternalService,
        ErrorCategory::Database,
        ErrorCategory::Network,
        ErrorCategory::Configuration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation_error",
            ErrorCategory::BusinessLogic => "business_logic_error",
            ErrorCategory::System => "system_error",
            ErrorCategory::Authentication => "authentication_error",
            ErrorCategory::ExternalService => "external_service_error",
            ErrorCategory::Database => "database_error",
            ErrorCategory::Network => "network_error",
            ErrorCategory::Configuration => "configuration_error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How bad an error is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorSeverity::Low => "low",
            ErrorSeverity::Medium => "medium",
            ErrorSeverity::High => "high",
            ErrorSeverity::Critical => "critical",
        }
    }

    /// Level a record of this severity is logged at.
    pub fn level(self) -> Level {
        match self {
            ErrorSeverity::Critical => Level::Fatal,
            ErrorSeverity::High => Level::Error,
            ErrorSeverity::Medium => Level::Warn,
            ErrorSeverity::Low => Level::Info,
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level for an optional severity; unset severities log as errors.
pub fn level_for(severity: Option<ErrorSeverity>) -> Level {
    severity.map_or(Level::Error, ErrorSeverity::level)
}

/// Everything known about one error occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: String,
    pub user_email: String,
    pub operation: String,
    pub component: String,
    pub method: String,
    pub category: ErrorCategory,
    pub severity: Option<ErrorSeverity>,
    pub details: Fields,
    pub correlation_id: String,
    pub trace_id: String,
    pub span_id: String,
    pub retry_count: u32,
    pub retryable: bool,
    pub client_ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorContext {
    pub fn new(
        category: ErrorCategory,
        component: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            category,
            component: component.into(),
            operation: operation.into(),
            timestamp: Utc::now(),
            ..Default::default()
        }
    }

    /// Context with category and severity inferred from an error's message.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        let (category, severity) = classify(&err.to_string());
        Self {
            category,
            severity: Some(severity),
            timestamp: Utc::now(),
            ..Default::default()
        }
    }

    /// Key shared by every occurrence of the same error pattern.
    pub fn frequency_key(&self) -> String {
        crate::monitor::frequency_key(self.category, &self.component, &self.operation)
    }

    /// Level this context is logged at.
    pub fn level(&self) -> Level {
        level_for(self.severity)
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>, email: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self.user_email = email.into();
        self
    }

    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_details(mut self, details: Fields) -> Self {
        self.details.extend(details);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn with_trace(mut self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self.span_id = span_id.into();
        self
    }

    pub fn with_retry(mut self, retry_count: u32, retryable: bool) -> Self {
        self.retry_count = retry_count;
        self.retryable = retryable;
        self
    }

    pub fn with_client(mut self, client_ip: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.client_ip = client_ip.into();
        self.user_agent = user_agent.into();
        self
    }

    /// Severity if set, otherwise `fallback`.
    pub(crate) fn severity_or(mut self, fallback: ErrorSeverity) -> Self {
        self.severity.get_or_insert(fallback);
        self
    }
}
