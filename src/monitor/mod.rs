//! Error frequency monitor and threshold alerting.
//!
//! # Responsibilities
//! - Count error occurrences per `category:component:operation` pattern
//! - Evaluate alert thresholds after every occurrence
//! - Rate-limit alerts per threshold and emit them as structured records
//! - Sweep stale patterns in the background
//!
//! # Data Flow
//! ```text
//! track_error(ctx)
//!     → frequencies (DashMap entry: count += 1, last_seen = now)
//!     → thresholds (read lock, collect matches)
//!     → last_alerts (mutex: check interval, claim slot)
//!     → Logger::warn() alert record, outside every lock
//! ```
//!
//! # Design Decisions
//! - Frequencies, thresholds and last-alert times use independent locks;
//!   counts may briefly disagree with alerts under concurrency
//! - The sweep joins the host's Tokio runtime when there is one, otherwise
//!   it runs on a dedicated thread

pub mod frequency;
pub mod sweeper;
pub mod threshold;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::config::MonitorConfig;
use crate::context::{ErrorCategory, ErrorContext};
use crate::lifecycle::{background, Shutdown};
use crate::logging::{LogType, Logger};
use crate::observability::metrics;

pub use frequency::{frequency_key, ErrorFrequency};
pub use sweeper::FrequencySweeper;
pub use threshold::AlertThreshold;

/// Tracks error patterns and raises threshold alerts.
pub struct ErrorMonitor {
    config: MonitorConfig,
    logger: Logger,
    frequencies: Arc<DashMap<String, ErrorFrequency>>,
    thresholds: RwLock<HashMap<String, AlertThreshold>>,
    last_alerts: Mutex<HashMap<String, DateTime<Utc>>>,
    shutdown: Shutdown,
}

impl std::fmt::Debug for ErrorMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorMonitor")
            .field("enabled", &self.config.enabled)
            .field("patterns", &self.frequencies.len())
            .field("thresholds", &self.thresholds.read().len())
            .finish()
    }
}

impl ErrorMonitor {
    /// Monitor writing alerts through `logger`.
    ///
    /// Starts the stale-record sweep when `max_age` is non-zero.
    pub fn new(config: MonitorConfig, logger: Logger) -> Self {
        let monitor = Self {
            config,
            logger,
            frequencies: Arc::new(DashMap::new()),
            thresholds: RwLock::new(HashMap::new()),
            last_alerts: Mutex::new(HashMap::new()),
            shutdown: Shutdown::new(),
        };
        monitor.start_sweeper();
        monitor
    }

    /// Monitor with [`AlertThreshold::defaults`] installed.
    pub fn with_default_thresholds(config: MonitorConfig, logger: Logger) -> Self {
        let monitor = Self::new(config, logger);
        for threshold in AlertThreshold::defaults() {
            monitor.add_threshold(threshold);
        }
        monitor
    }

    fn start_sweeper(&self) {
        if !self.config.enabled
            || self.config.max_age_secs == 0
            || self.config.cleanup_interval_secs == 0
        {
            return;
        }
        let sweeper = FrequencySweeper::new(
            Arc::clone(&self.frequencies),
            self.config.max_age(),
            self.config.cleanup_interval(),
        );
        background::spawn_task("logcore-sweeper", sweeper.run(self.shutdown.subscribe()));
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record one occurrence of the pattern in `ctx` and alert if a threshold trips.
    pub fn track_error(&self, ctx: &ErrorContext) {
        if !self.config.enabled {
            return;
        }

        let (snapshot, now) = {
            let mut entry = self
                .frequencies
                .entry(ctx.frequency_key())
                .or_insert_with(|| ErrorFrequency::new(ctx, Utc::now()));
            let now = Utc::now();
            entry.record(now);
            (entry.value().clone(), now)
        };
        metrics::record_error_tracked(ctx.category.as_str());

        self.evaluate_thresholds(&snapshot, now);
    }

    fn evaluate_thresholds(&self, freq: &ErrorFrequency, now: DateTime<Utc>) {
        let tripped: Vec<AlertThreshold> = self
            .thresholds
            .read()
            .values()
            .filter(|t| t.matches(freq) && t.is_exceeded(freq, now))
            .cloned()
            .collect();

        for threshold in tripped {
            if self.claim_alert(&threshold, now) {
                self.emit_alert(&threshold, freq);
            }
        }
    }

    /// Record `now` as the threshold's last alert unless one fired within its interval.
    fn claim_alert(&self, threshold: &AlertThreshold, now: DateTime<Utc>) -> bool {
        let interval = chrono::Duration::from_std(threshold.alert_interval)
            .unwrap_or(chrono::Duration::MAX);
        let mut last_alerts = self.last_alerts.lock();
        match last_alerts.get(&threshold.key()) {
            Some(last) if now.signed_duration_since(*last) < interval => false,
            _ => {
                last_alerts.insert(threshold.key(), now);
                true
            }
        }
    }

    fn emit_alert(&self, threshold: &AlertThreshold, freq: &ErrorFrequency) {
        metrics::record_alert_emitted(freq.category.as_str());
        self.logger
            .warn()
            .log_type(LogType::Alert)
            .field("alert_type", "error_threshold_exceeded")
            .field("category", freq.category.as_str())
            .field("component", &freq.component)
            .field("operation", &freq.operation)
            .field("count", freq.count)
            .field("threshold", threshold.max_count)
            .field("severity", threshold.severity.as_str())
            .field("time_window", format!("{:?}", threshold.time_window))
            .field("first_seen", freq.first_seen)
            .field("last_seen", freq.last_seen)
            .msg("Error threshold exceeded");
    }

    /// Install a threshold, replacing any with the same key.
    pub fn add_threshold(&self, threshold: AlertThreshold) {
        self.thresholds.write().insert(threshold.key(), threshold);
    }

    /// Remove a threshold. Returns whether it existed.
    pub fn remove_threshold(&self, category: ErrorCategory, component: &str, operation: &str) -> bool {
        let key = frequency_key(category, component, operation);
        let removed = self.thresholds.write().remove(&key).is_some();
        if removed {
            self.last_alerts.lock().remove(&key);
        }
        removed
    }

    /// Installed thresholds, ordered by key.
    pub fn thresholds(&self) -> Vec<AlertThreshold> {
        let mut thresholds: Vec<_> = self.thresholds.read().values().cloned().collect();
        thresholds.sort_by_key(AlertThreshold::key);
        thresholds
    }

    pub fn get_frequency(
        &self,
        category: ErrorCategory,
        component: &str,
        operation: &str,
    ) -> Option<ErrorFrequency> {
        self.frequencies
            .get(&frequency_key(category, component, operation))
            .map(|entry| entry.value().clone())
    }

    pub fn get_all_frequencies(&self) -> HashMap<String, ErrorFrequency> {
        self.frequencies
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Total occurrences per category.
    pub fn get_stats(&self) -> HashMap<ErrorCategory, u64> {
        let mut stats = HashMap::new();
        for entry in self.frequencies.iter() {
            *stats.entry(entry.category).or_insert(0) += entry.count;
        }
        stats
    }

    /// Patterns with the highest counts first; `limit == 0` returns all.
    pub fn get_top_errors(&self, limit: usize) -> Vec<ErrorFrequency> {
        let mut all: Vec<ErrorFrequency> = self
            .frequencies
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key().cmp(&b.key())));
        if limit > 0 {
            all.truncate(limit);
        }
        all
    }

    /// Forget one pattern. Returns whether it was tracked.
    pub fn reset_frequency(&self, category: ErrorCategory, component: &str, operation: &str) -> bool {
        self.frequencies
            .remove(&frequency_key(category, component, operation))
            .is_some()
    }

    /// Forget every pattern. Thresholds and alert history are kept.
    pub fn clear_all(&self) {
        self.frequencies.clear();
    }

    /// Run the stale-record eviction now. Returns how many records were removed.
    pub fn sweep_stale(&self) -> usize {
        if self.config.max_age_secs == 0 {
            return 0;
        }
        sweeper::evict_stale(&self.frequencies, self.config.max_age(), Utc::now())
    }

    /// Stop the background sweep. Later calls are no-ops.
    pub fn close(&self) {
        if self.shutdown.trigger() {
            tracing::debug!("Error monitor closed");
        }
    }
}

impl Drop for ErrorMonitor {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}
