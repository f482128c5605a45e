//! Typed record composers.
//!
//! Each composer wraps a [`Logger`](crate::logging::Logger) and writes one
//! record per call with a fixed `log_type` and message:
//! - [`AuditLogger`]: security and money-moving actions
//! - [`PerformanceLogger`]: request, query and job timings
//! - [`ErrorLogger`]: failures described by an
//!   [`ErrorContext`](crate::context::ErrorContext), optionally tracked by an
//!   [`ErrorMonitor`](crate::monitor::ErrorMonitor)

pub mod amount;
pub mod audit;
pub mod error;
pub mod performance;

pub use amount::{format_amount, format_amount_f64};
pub use audit::{AuditLogger, TransferRecord};
pub use error::ErrorLogger;
pub use performance::{PerformanceLogger, Timer};
