//! Structured logging pipeline.
//!
//! # Data Flow
//! ```text
//! Logger::info().field(..).msg(..)
//!     → level filter → sampler → merge scoped context
//!     → format.rs (JSON or console line)
//!     → LogWriter (console / daily file / both)
//! ```
//!
//! `tracing` events reach the same outputs through [`LogBridgeLayer`].

pub mod bridge;
pub mod event;
pub mod format;
pub mod logger;
pub mod manager;
pub mod sampling;
pub mod writer;

pub use bridge::LogBridgeLayer;
pub use event::{FieldValue, Fields, Level, LogEvent, LogType};
pub use format::LogFormat;
pub use logger::{EventBuilder, Logger, LoggerSettings};
pub use manager::LoggerManager;
pub use sampling::Sampler;
pub use writer::{BufferWriter, ConsoleWriter, LogWriter, MultiWriter};
