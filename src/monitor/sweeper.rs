//! Periodic eviction of stale frequency records.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::monitor::frequency::ErrorFrequency;
use crate::observability::metrics;

/// Background task removing records not seen within `max_age`.
pub struct FrequencySweeper {
    frequencies: Arc<DashMap<String, ErrorFrequency>>,
    max_age: Duration,
    interval: Duration,
}

impl FrequencySweeper {
    pub fn new(
        frequencies: Arc<DashMap<String, ErrorFrequency>>,
        max_age: Duration,
        interval: Duration,
    ) -> Self {
        Self {
            frequencies,
            max_age,
            interval,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::debug!(
            interval_secs = self.interval.as_secs(),
            max_age_secs = self.max_age.as_secs(),
            "Frequency sweeper starting"
        );

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = evict_stale(&self.frequencies, self.max_age, Utc::now());
                    if removed > 0 {
                        tracing::debug!(removed, "Evicted stale error frequencies");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Frequency sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Remove records last seen before `now - max_age`. Returns how many were removed.
pub fn evict_stale(
    frequencies: &DashMap<String, ErrorFrequency>,
    max_age: Duration,
    now: DateTime<Utc>,
) -> usize {
    let Some(cutoff) = chrono::Duration::from_std(max_age)
        .ok()
        .and_then(|age| now.checked_sub_signed(age))
    else {
        return 0;
    };

    let mut removed = 0;
    frequencies.retain(|_, freq| {
        let keep = freq.last_seen >= cutoff;
        if !keep {
            removed += 1;
        }
        keep
    });
    metrics::record_frequencies_evicted(removed);
    removed
}
