//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::LoggingConfig;
use crate::config::validation::validate_config;
use crate::error::ConfigError;

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoggingConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LoggingConfig, ConfigError> {
    let config: LoggingConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "level = \"warn\"\nformat = \"console\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "console");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/logcore.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("level = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_is_descriptive() {
        let err = parse_config("output = \"syslog\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("syslog"));
    }
}
