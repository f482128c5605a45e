//! Metrics collection.
//!
//! # Metrics
//! - `logcore_events_written_total` (counter): records written, by level
//! - `logcore_events_dropped_total` (counter): records dropped, by reason
//! - `logcore_write_errors_total` (counter): failed writes to the output
//! - `logcore_errors_tracked_total` (counter): error occurrences, by category
//! - `logcore_alerts_emitted_total` (counter): threshold alerts, by category
//! - `logcore_rotations_total` (counter): file rotations
//! - `logcore_maintenance_failures_total` (counter): compression/cleanup failures
//! - `logcore_files_removed_total` (counter): files pruned by retention
//! - `logcore_frequencies_evicted_total` (counter): stale error frequency records swept
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; installing an exporter is the
//!   host application's job
//! - Labels are static strings to keep updates allocation-free

use metrics::counter;

pub fn record_event_written(level: &'static str) {
    counter!("logcore_events_written_total", "level" => level).increment(1);
}

pub fn record_event_dropped(reason: &'static str) {
    counter!("logcore_events_dropped_total", "reason" => reason).increment(1);
}

pub fn record_write_error() {
    counter!("logcore_write_errors_total").increment(1);
}

pub fn record_error_tracked(category: &'static str) {
    counter!("logcore_errors_tracked_total", "category" => category).increment(1);
}

pub fn record_alert_emitted(category: &'static str) {
    counter!("logcore_alerts_emitted_total", "category" => category).increment(1);
}

pub fn record_rotation() {
    counter!("logcore_rotations_total").increment(1);
}

pub fn record_maintenance_failure(task: &'static str) {
    counter!("logcore_maintenance_failures_total", "task" => task).increment(1);
}

pub fn record_files_removed(count: usize) {
    counter!("logcore_files_removed_total").increment(count as u64);
}

pub fn record_frequencies_evicted(count: usize) {
    counter!("logcore_frequencies_evicted_total").increment(count as u64);
}
