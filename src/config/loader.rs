//! Configuration loader for Memory-Edit
//!
//! Handles loading configuration from TOML files and merging with defaults.

use super::defaults::default_config;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory by [`load_config`]
pub const DEFAULT_CONFIG_FILE: &str = "memory-edit.toml";

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_memory")]
    pub memory: MemoryConfig,

    #[serde(default = "default_backend")]
    pub backend: BackendConfig,

    #[serde(default = "default_logging")]
    pub logging: LoggingConfig,
}

/// Region filtering and transfer limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Substrings; any map line containing one is skipped
    #[serde(default = "default_exclusions")]
    pub default_exclusions: Vec<String>,
    /// Globs matched against the backing path
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_max_read_size")]
    pub max_read_size: usize,
}

/// Backend selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// `auto`, `ptrace`, `vectorized` or `windows`
    #[serde(default = "default_preferred")]
    pub preferred: String,
    #[serde(default = "default_proc_root")]
    pub proc_root: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if the file is missing or unreadable
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(config) => config,
            Err(ConfigError::FileNotFound(_)) => Config::default(),
            Err(err) => {
                tracing::warn!(
                    path = %self.config_path.display(),
                    error = %err,
                    "ignoring unreadable configuration file"
                );
                Config::default()
            }
        }
    }

    /// Saves configuration to file
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}

/// Loads configuration from the default location, falling back to defaults
pub fn load_config() -> Result<Config, ConfigError> {
    let config = ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default();
    super::validate_config(&config)?;
    Ok(config)
}

// Default functions for serde
fn default_memory() -> MemoryConfig {
    let defaults = default_config();
    MemoryConfig {
        default_exclusions: defaults.memory.default_exclusions,
        exclude_patterns: defaults.memory.exclude_patterns,
        max_read_size: defaults.memory.max_read_size,
    }
}

fn default_backend() -> BackendConfig {
    let defaults = default_config();
    BackendConfig {
        preferred: defaults.backend.preferred,
        proc_root: defaults.backend.proc_root,
    }
}

fn default_logging() -> LoggingConfig {
    LoggingConfig {
        level: default_config().logging.level,
    }
}

// Individual field defaults
fn default_exclusions() -> Vec<String> {
    default_config().memory.default_exclusions
}

fn default_exclude_patterns() -> Vec<String> {
    default_config().memory.exclude_patterns
}

fn default_max_read_size() -> usize {
    default_config().memory.max_read_size
}

fn default_preferred() -> String {
    default_config().backend.preferred
}

fn default_proc_root() -> String {
    default_config().backend.proc_root
}

fn default_log_level() -> String {
    default_config().logging.level
}

impl Default for Config {
    fn default() -> Self {
        Config {
            memory: default_memory(),
            backend: default_backend(),
            logging: default_logging(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.preferred, "auto");
        assert_eq!(config.backend.proc_root, "/proc");
        assert_eq!(config.memory.default_exclusions.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let result = loader.load();
        assert!(matches!(result.unwrap_err(), ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let loader = ConfigLoader::new("nonexistent.toml");
        let config = loader.load_or_default();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_or_default_with_broken_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "[memory\nmax_read_size = ").unwrap();

        let loader = ConfigLoader::new(&config_path);
        assert!(matches!(loader.load(), Err(ConfigError::TomlParse(_))));
        assert_eq!(loader.load_or_default().backend.preferred, "auto");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.memory.exclude_patterns = vec!["*.so".to_string()];
        config.backend.preferred = "ptrace".to_string();
        let loader = ConfigLoader::new(&config_path);

        loader.save(&config).unwrap();
        assert!(config_path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded.memory.exclude_patterns, vec!["*.so".to_string()]);
        assert_eq!(loaded.backend.preferred, "ptrace");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
            [backend]
            preferred = "vectorized"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.preferred, "vectorized");
        assert_eq!(config.backend.proc_root, "/proc");
        assert_eq!(config.memory.max_read_size, 67108864);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_exclusions_override_defaults() {
        let toml_str = r#"
            [memory]
            default_exclusions = []
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.memory.default_exclusions.is_empty());
    }
}
