//! Per-pattern occurrence counters.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::{ErrorCategory, ErrorContext};

/// Key identifying an error pattern: `category:component:operation`.
pub fn frequency_key(category: ErrorCategory, component: &str, operation: &str) -> String {
    format!("{}:{}:{}", category.as_str(), component, operation)
}

/// Running count of one error pattern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFrequency {
    pub category: ErrorCategory,
    pub component: String,
    pub operation: String,
    pub count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl ErrorFrequency {
    /// Empty record for the pattern of `ctx`; the first occurrence is added by
    /// [`ErrorFrequency::record`].
    pub(crate) fn new(ctx: &ErrorContext, now: DateTime<Utc>) -> Self {
        Self {
            category: ctx.category,
            component: ctx.component.clone(),
            operation: ctx.operation.clone(),
            count: 0,
            first_seen: now,
            last_seen: now,
        }
    }

    pub(crate) fn record(&mut self, now: DateTime<Utc>) {
        self.count += 1;
        if now > self.last_seen {
            self.last_seen = now;
        }
    }

    pub fn key(&self) -> String {
        frequency_key(self.category, &self.component, &self.operation)
    }
}
