//! Self-observability of the logging core.
//!
//! The crate's own diagnostics (maintenance failures, monitor lifecycle) are
//! emitted as `tracing` events; counters go through `metrics.rs`. Hosts can
//! route the `tracing` events back into the managed log output with
//! `LoggerManager::tracing_layer`.

pub mod metrics;
