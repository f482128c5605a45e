//! Lifecycle management for background work.
//!
//! # Data Flow
//! ```text
//! Sweep (monitor):
//!     ErrorMonitor::new → tokio task on an interval → Shutdown::trigger on close
//!
//! Maintenance (sink):
//!     rotation → background::spawn_blocking(compress / cleanup)
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative: tasks check the signal between units of work
//! - In-flight writes are never aborted

pub mod background;
pub mod shutdown;

pub use shutdown::Shutdown;
