//! Configuration loading and management
//!
//! This module provides utilities for loading application configuration
//! from environment variables and files.

pub mod loader;

use lutem_common::resilience::RetryPolicy;
use lutem_domain::{LutemError, Result, RetryConfig};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

/// Build the process-wide retry policy from configuration.
///
/// # Errors
/// Returns `LutemError::Config` when `max_delay_ms < base_delay_ms`.
pub fn retry_policy(config: &RetryConfig) -> Result<RetryPolicy> {
    RetryPolicy::new(config.max_attempts, config.base_delay(), config.max_delay())
        .map_err(|err| LutemError::Config(err.to_string()))
}
