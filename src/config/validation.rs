//! Configuration validation.
//!
//! Serde handles syntax; this module checks values. All problems are
//! collected so a bad config file is reported in one pass.

use crate::config::schema::LoggingConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid log level {0:?} (expected trace, debug, info, warn, error or fatal)")]
    InvalidLevel(String),

    #[error("invalid log format {0:?} (expected json or console)")]
    InvalidFormat(String),

    #[error("invalid output {0:?} (expected console, file or both)")]
    InvalidOutput(String),

    #[error("file output requires a non-empty directory")]
    MissingDirectory,

    #[error("sampling.thereafter must be at least 1 when sampling is enabled")]
    InvalidSampling,

    #[error("monitor.cleanup_interval_secs must be positive when max_age_secs is set")]
    InvalidCleanupInterval,
}

/// Validate a configuration, returning every error found.
pub fn validate_config(config: &LoggingConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.level() {
        errors.push(e);
    }
    if let Err(e) = config.format() {
        errors.push(e);
    }
    match config.output() {
        Ok(output) => {
            if output.uses_file() && config.directory.as_os_str().is_empty() {
                errors.push(ValidationError::MissingDirectory);
            }
        }
        Err(e) => errors.push(e),
    }

    if config.sampling.enabled && config.sampling.thereafter == 0 {
        errors.push(ValidationError::InvalidSampling);
    }

    if config.monitor.enabled
        && config.monitor.max_age_secs > 0
        && config.monitor.cleanup_interval_secs == 0
    {
        errors.push(ValidationError::InvalidCleanupInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = LoggingConfig {
            level: "verbose".into(),
            format: "xml".into(),
            output: "printer".into(),
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidLevel("verbose".into()),
                ValidationError::InvalidFormat("xml".into()),
                ValidationError::InvalidOutput("printer".into()),
            ]
        );
    }

    #[test]
    fn test_file_output_needs_directory() {
        let config = LoggingConfig {
            output: "file".into(),
            directory: PathBuf::new(),
            ..Default::default()
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::MissingDirectory]
        );

        // Console output does not care about the directory.
        let config = LoggingConfig {
            directory: PathBuf::new(),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_sampling_rate_must_be_positive() {
        let mut config = LoggingConfig::default();
        config.sampling.enabled = true;
        config.sampling.thereafter = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidSampling]
        );
    }

    #[test]
    fn test_sweep_needs_interval() {
        let mut config = LoggingConfig::default();
        config.monitor.cleanup_interval_secs = 0;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidCleanupInterval]
        );

        config.monitor.max_age_secs = 0;
        assert!(validate_config(&config).is_ok());
    }
}
