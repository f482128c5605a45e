//! Alert threshold rules.
//!
//! A threshold matches a frequency record when the categories are equal and
//! its component and operation are either empty (wildcard) or equal. It is
//! exceeded once the record's count reaches `max_count` and the record was
//! last seen within `time_window`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::{ErrorCategory, ErrorSeverity};
use crate::monitor::frequency::{frequency_key, ErrorFrequency};

const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// A rule that raises an alert when an error pattern repeats too often.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertThreshold {
    pub category: ErrorCategory,
    /// Empty matches any component.
    pub component: String,
    /// Empty matches any operation.
    pub operation: String,
    pub max_count: u64,
    pub time_window: Duration,
    pub severity: ErrorSeverity,
    /// Minimum spacing between two alerts of this threshold.
    pub alert_interval: Duration,
}

impl AlertThreshold {
    /// Category-wide threshold with medium severity and a five minute alert interval.
    pub fn new(category: ErrorCategory, max_count: u64, time_window: Duration) -> Self {
        Self {
            category,
            component: String::new(),
            operation: String::new(),
            max_count,
            time_window,
            severity: ErrorSeverity::Medium,
            alert_interval: DEFAULT_ALERT_INTERVAL,
        }
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    pub fn operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn severity(mut self, severity: ErrorSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn alert_interval(mut self, interval: Duration) -> Self {
        self.alert_interval = interval;
        self
    }

    /// Registry key; also keys the last-alert timestamp.
    pub fn key(&self) -> String {
        frequency_key(self.category, &self.component, &self.operation)
    }

    pub fn matches(&self, freq: &ErrorFrequency) -> bool {
        self.category == freq.category
            && (self.component.is_empty() || self.component == freq.component)
            && (self.operation.is_empty() || self.operation == freq.operation)
    }

    pub fn is_exceeded(&self, freq: &ErrorFrequency, now: DateTime<Utc>) -> bool {
        if freq.count < self.max_count {
            return false;
        }
        match chrono::Duration::from_std(self.time_window)
            .ok()
            .and_then(|window| now.checked_sub_signed(window))
        {
            Some(window_start) => freq.last_seen >= window_start,
            None => true,
        }
    }

    /// Thresholds installed by [`ErrorMonitor::with_default_thresholds`].
    ///
    /// [`ErrorMonitor::with_default_thresholds`]: crate::monitor::ErrorMonitor::with_default_thresholds
    pub fn defaults() -> Vec<AlertThreshold> {
        vec![
            AlertThreshold::new(ErrorCategory::Database, 10, Duration::from_secs(5 * 60))
                .severity(ErrorSeverity::High)
                .alert_interval(Duration::from_secs(10 * 60)),
            AlertThreshold::new(ErrorCategory::ExternalService, 20, Duration::from_secs(5 * 60))
                .severity(ErrorSeverity::Medium)
                .alert_interval(Duration::from_secs(15 * 60)),
            AlertThreshold::new(ErrorCategory::Authentication, 50, Duration::from_secs(10 * 60))
                .severity(ErrorSeverity::High)
                .alert_interval(Duration::from_secs(5 * 60)),
            AlertThreshold::new(ErrorCategory::System, 5, Duration::from_secs(60))
                .severity(ErrorSeverity::Critical)
                .alert_interval(Duration::from_secs(5 * 60)),
        ]
    }
}
