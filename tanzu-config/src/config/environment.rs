//! Environment variable handling for store configuration overrides.
//!
//! This module provides support for the TANZU_CONFIG* environment variables
//! that override programmatic store settings.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::store::StoreConfig;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "TANZU_CONFIG";

/// Environment variable holding the maximum lock wait in seconds.
pub const LOCK_TIMEOUT_ENV: &str = "TANZU_CONFIG_LOCK_TIMEOUT_SECONDS";

/// Handles environment variable overrides for store configuration.
///
/// # Examples
///
/// ```no_run
/// use tanzu_config::config::EnvironmentConfig;
/// use tanzu_config::StoreConfig;
///
/// let mut config = StoreConfig::new("/tmp/tanzu/config.yaml");
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to a store configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value (an empty
    /// path, or a lock timeout that is not a non-negative number of seconds).
    pub fn apply_overrides(config: &mut StoreConfig) -> Result<()> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV) {
            config.path = Self::parse_path(CONFIG_PATH_ENV, &path)?;
        }

        if let Ok(seconds) = env::var(LOCK_TIMEOUT_ENV) {
            config.lock_timeout = Self::parse_seconds(LOCK_TIMEOUT_ENV, &seconds)?;
        }

        Ok(())
    }

    fn parse_path(field: &str, s: &str) -> Result<PathBuf> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation {
                field: field.into(),
                message: "Must not be empty".into(),
            });
        }
        Ok(PathBuf::from(trimmed))
    }

    /// Parse a duration given in (possibly fractional) seconds.
    fn parse_seconds(field: &str, s: &str) -> Result<Duration> {
        let seconds: f64 = s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Invalid number of seconds: '{s}'"),
        })?;

        Duration::try_from_secs_f64(seconds).map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative, finite number of seconds: '{s}'"),
        })
    }
}
