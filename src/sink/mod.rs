//! Daily rotating file sink.
//!
//! # Data Flow
//! ```text
//! write(bytes)
//!     → date changed? → rotate (swap handle under lock)
//!                        → background: compress.rs (retired file → .gz)
//!                        → background: retention.rs (prune by age / count)
//!     → append to app-<YYYY-MM-DD>.log
//! ```

pub mod clock;
pub mod compress;
pub mod daily;
pub mod retention;

pub use clock::{Clock, ManualClock, SystemClock};
pub use daily::{DailyFileConfig, DailyFileWriter};
pub use retention::RetentionPolicy;
