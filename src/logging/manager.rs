//! Logger manager: builds the output pipeline from configuration.
//!
//! # Responsibilities
//! - Validate a [`LoggingConfig`] and assemble console, file or both outputs
//! - Own the base [`Logger`] every scoped logger is derived from
//! - Expose the file sink's operational controls (rotate, cleanup, sync)
//! - Probe output health and close the pipeline
//!
//! # Design Decisions
//! - Console-only managers accept `rotate` and `cleanup` as no-ops
//! - `close` is idempotent; records written after it are reported as failures

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{validate_config, LoggingConfig};
use crate::error::{ConfigError, LoggingError};
use crate::logging::bridge::LogBridgeLayer;
use crate::logging::event::Level;
use crate::logging::logger::{Logger, LoggerSettings};
use crate::logging::writer::{ConsoleWriter, LogWriter, MultiWriter};
use crate::sink::{DailyFileConfig, DailyFileWriter};

/// Owner of the configured logging pipeline.
pub struct LoggerManager {
    config: LoggingConfig,
    writer: Arc<dyn LogWriter>,
    file: Option<DailyFileWriter>,
    logger: Logger,
    closed: AtomicBool,
}

impl std::fmt::Debug for LoggerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerManager")
            .field("output", &self.config.output)
            .field("level", &self.level())
            .field("file", &self.file)
            .finish()
    }
}

impl LoggerManager {
    /// Validate `config` and open its outputs.
    pub fn new(config: LoggingConfig) -> Result<Self, LoggingError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let output = config.output().map_err(single)?;

        let file = if output.uses_file() {
            Some(DailyFileWriter::new(file_config(&config))?)
        } else {
            None
        };

        let mut writers: Vec<Arc<dyn LogWriter>> = Vec::new();
        if output.uses_console() {
            writers.push(Arc::new(ConsoleWriter));
        }
        if let Some(file) = &file {
            writers.push(Arc::new(file.clone()));
        }
        let writer: Arc<dyn LogWriter> = match writers.len() {
            1 => writers.remove(0),
            _ => Arc::new(MultiWriter::new(writers)),
        };

        Self::assemble(config, writer, file)
    }

    /// Manager writing to a caller-supplied output instead of the configured one.
    pub fn with_writer(config: LoggingConfig, writer: Arc<dyn LogWriter>) -> Result<Self, LoggingError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        Self::assemble(config, writer, None)
    }

    fn assemble(
        config: LoggingConfig,
        writer: Arc<dyn LogWriter>,
        file: Option<DailyFileWriter>,
    ) -> Result<Self, LoggingError> {
        let settings = LoggerSettings {
            level: config.level().map_err(single)?,
            format: config.format().map_err(single)?,
            local_time: config.local_time,
            caller_info: config.caller_info,
            sampling: config.sampling.clone(),
        };
        let logger = Logger::with_settings(Arc::clone(&writer), settings);

        tracing::debug!(
            output = %config.output,
            level = %logger.level(),
            directory = %config.directory.display(),
            "Logger initialized"
        );

        Ok(Self {
            config,
            writer,
            file,
            logger,
            closed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Base logger; scope it with the `with_*` methods.
    pub fn logger(&self) -> Logger {
        self.logger.clone()
    }

    pub fn level(&self) -> Level {
        self.logger.level()
    }

    /// Change the minimum level of every logger derived from this manager.
    pub fn set_level(&self, level: Level) {
        self.logger.set_level(level);
    }

    /// The daily file sink, when file output is configured.
    pub fn file_writer(&self) -> Option<&DailyFileWriter> {
        self.file.as_ref()
    }

    /// Close the current file and start a new one.
    pub fn rotate(&self) -> Result<(), LoggingError> {
        match &self.file {
            Some(file) => Ok(file.rotate()?),
            None => Ok(()),
        }
    }

    /// Apply the retention policy now.
    pub fn cleanup(&self) -> Result<(), LoggingError> {
        match &self.file {
            Some(file) => Ok(file.cleanup()?),
            None => Ok(()),
        }
    }

    /// Flush every output.
    pub fn sync(&self) -> Result<(), LoggingError> {
        self.writer
            .sync()
            .map_err(|e| LoggingError::Sink(e.into()))
    }

    /// Path of the file currently written, when file output is configured.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.file.as_ref().map(DailyFileWriter::current_file_name)
    }

    /// Sink files in the log directory, newest first.
    pub fn list_files(&self) -> Result<Vec<PathBuf>, LoggingError> {
        match &self.file {
            Some(file) => Ok(file.list_files()?),
            None => Ok(Vec::new()),
        }
    }

    /// Confirm the output still accepts writes.
    pub fn health_check(&self) -> Result<(), LoggingError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(LoggingError::HealthCheck(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "logger is closed",
            )));
        }
        self.logger.probe().map_err(LoggingError::HealthCheck)
    }

    /// Flush and release every output. Later calls are no-ops.
    pub fn close(&self) -> Result<(), LoggingError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.writer
            .close()
            .map_err(|e| LoggingError::Sink(e.into()))
    }

    /// Layer forwarding `tracing` events into this pipeline.
    pub fn tracing_layer(&self) -> LogBridgeLayer {
        LogBridgeLayer::new(self.logger.clone())
    }

    /// Install this pipeline as the global `tracing` subscriber.
    ///
    /// `RUST_LOG` overrides the configured level for `tracing` events.
    pub fn install_global(&self) -> Result<(), LoggingError> {
        let directive = match self.level() {
            Level::Fatal => Level::Error,
            level => level,
        };
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(directive.as_str())),
            )
            .with(self.tracing_layer())
            .try_init()?;
        Ok(())
    }
}

fn single(err: crate::config::ValidationError) -> LoggingError {
    ConfigError::Validation(vec![err]).into()
}

fn file_config(config: &LoggingConfig) -> DailyFileConfig {
    DailyFileConfig {
        directory: config.directory.clone(),
        max_age: config.max_age,
        max_backups: config.max_backups,
        compress: config.compress,
        local_time: config.local_time,
    }
}
