//! Logging bootstrap
//!
//! Installs a global `tracing` subscriber. `RUST_LOG` takes precedence over
//! the configured level.

use lutem_domain::{LoggingConfig, LutemError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// Returns `Ok(false)` when a global subscriber was already installed (by a
/// previous call or by the host application); that is not an error.
///
/// # Errors
/// Returns `LutemError::Config` if `config.level` is not a valid filter.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialized");
    }
    Ok(installed)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level)
        .map_err(|e| LutemError::Config(format!("Invalid log level '{}': {e}", config.level)))
}
