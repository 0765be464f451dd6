//! Configuration validator for Memory-Edit
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{BackendConfig, Config, ConfigError, LoggingConfig, MemoryConfig};
use crate::backend::BackendKind;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_memory(&config.memory)?;
        Self::validate_backend(&config.backend)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates memory configuration
    fn validate_memory(memory: &MemoryConfig) -> Result<(), ConfigError> {
        if memory.max_read_size == 0 {
            return Err(ConfigError::Invalid(
                "Maximum read size must be greater than 0".to_string(),
            ));
        }

        if memory.default_exclusions.iter().any(|s| s.is_empty()) {
            // An empty substring would exclude every mapping
            return Err(ConfigError::Invalid(
                "Default exclusions cannot contain empty entries".to_string(),
            ));
        }

        if memory.exclude_patterns.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::Invalid(
                "Exclude patterns cannot contain empty entries".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates backend configuration
    fn validate_backend(backend: &BackendConfig) -> Result<(), ConfigError> {
        if !backend.preferred.eq_ignore_ascii_case("auto")
            && backend.preferred.parse::<BackendKind>().is_err()
        {
            return Err(ConfigError::Invalid(format!(
                "Invalid backend: {}. Must be one of: auto, ptrace, vectorized, windows",
                backend.preferred
            )));
        }

        if backend.proc_root.is_empty() {
            return Err(ConfigError::Invalid(
                "Process filesystem root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_max_read_size() {
        let mut config = Config::default();
        config.memory.max_read_size = 0;
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("read size"));
    }

    #[test]
    fn test_empty_exclusion_entries() {
        let mut config = Config::default();
        config.memory.default_exclusions.push(String::new());
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.memory.exclude_patterns.push(String::new());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_backend_names() {
        let mut config = Config::default();
        for name in ["auto", "AUTO", "ptrace", "vectorized", "windows"] {
            config.backend.preferred = name.to_string();
            assert!(validate_config(&config).is_ok(), "{} should be valid", name);
        }

        config.backend.preferred = "dma".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("Invalid backend"));
    }

    #[test]
    fn test_empty_proc_root() {
        let mut config = Config::default();
        config.backend.proc_root = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();
        let result = validate_config(&config);
        assert!(result.unwrap_err().to_string().contains("log level"));
    }
}
