//! Burst-then-rate sampling.
//!
//! Events are counted per level and message. Within each period the first
//! `initial` events of a kind pass; after that only the first of every
//! `thereafter` passes until the period rolls over. Warnings and above are
//! never sampled out.
//!
//! Counters live in a fixed table of buckets, so distinct messages that hash
//! to the same bucket share a window and memory stays bounded.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::SamplingConfig;
use crate::logging::event::Level;

const BUCKETS: usize = 4096;

struct Window {
    started: Instant,
    seen: u64,
}

/// Volume sampler shared by every logger derived from one manager.
pub struct Sampler {
    initial: u64,
    thereafter: u64,
    period: Duration,
    windows: Box<[Mutex<Window>]>,
}

impl Sampler {
    pub fn new(initial: u32, thereafter: u32, period: Duration) -> Self {
        let started = Instant::now();
        Self {
            initial: initial.into(),
            thereafter: u64::from(thereafter.max(1)),
            period,
            windows: (0..BUCKETS)
                .map(|_| Mutex::new(Window { started, seen: 0 }))
                .collect(),
        }
    }

    /// Build a one-second sampler from config, or `None` when disabled.
    pub fn from_config(config: &SamplingConfig) -> Option<Self> {
        config
            .enabled
            .then(|| Self::new(config.initial, config.thereafter, Duration::from_secs(1)))
    }

    /// Decide whether an event at `level` with `message` is kept.
    pub fn sample(&self, level: Level, message: &str) -> bool {
        if level >= Level::Warn {
            return true;
        }
        self.sample_at(level, message, Instant::now())
    }

    fn bucket(level: Level, message: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        level.hash(&mut hasher);
        message.hash(&mut hasher);
        (hasher.finish() % BUCKETS as u64) as usize
    }

    fn sample_at(&self, level: Level, message: &str, now: Instant) -> bool {
        let mut window = self.windows[Self::bucket(level, message)].lock();
        if now.duration_since(window.started) >= self.period {
            window.started = now;
            window.seen = 0;
        }
        window.seen += 1;

        if window.seen <= self.initial {
            return true;
        }
        (window.seen - self.initial - 1) % self.thereafter == 0
    }
}
