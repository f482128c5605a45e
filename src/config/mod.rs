//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoggingConfig (validated, immutable)
//!     → handed to LoggerManager / ErrorMonitor
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; only the level can change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config};
pub use schema::{LoggingConfig, MonitorConfig, OutputTarget, SamplingConfig};
pub use validation::{validate_config, ValidationError};
