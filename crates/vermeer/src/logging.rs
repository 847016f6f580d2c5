//! Tracing subscriber setup.

use crate::LoggingConfig;
use tracing_subscriber::EnvFilter;
use vermeer_error::{ConfigError, VermeerResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when it parses.
///
/// # Errors
///
/// `ConfigError` when the configured level is not a valid filter or a
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> VermeerResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.level()).map_err(|e| {
            ConfigError::new(format!("Invalid log level '{}': {}", config.level(), e))
        })?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if *config.json() {
        builder.json().try_init()
    } else {
        builder.with_target(false).try_init()
    };

    installed
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;
    Ok(())
}
