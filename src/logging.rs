//! Subscriber setup for applications embedding Memory-Edit
//!
//! The library itself only emits `tracing` events; call [`init_logging`] once
//! from the application to see them. `RUST_LOG` overrides the configured level.

use crate::config::{ConfigError, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG` or `config.level`
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_filter(config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| ConfigError::Invalid(format!("logging already initialised: {}", err)))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|err| {
            ConfigError::Invalid(format!("Invalid log level {}: {}", config.level, err))
        }),
    }
}
