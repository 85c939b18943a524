//! Store configuration and path resolution.
//!
//! This module provides the parameters a [`ConfigStore`](crate::ConfigStore)
//! is opened with: where the configuration file lives, how long to wait for
//! the file lock, and whether missing parent directories are created.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::EnvironmentConfig;
use crate::error::{Error, Result};

/// Default time to wait for the configuration file lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a configuration store.
///
/// # Examples
///
/// ```
/// use tanzu_config::StoreConfig;
/// use std::time::Duration;
///
/// // Create a configuration with default settings
/// let config = StoreConfig::new("/tmp/tanzu/config.yaml");
///
/// // Customize the configuration
/// let config = StoreConfig::new("/tmp/tanzu/config.yaml")
///     .with_lock_timeout(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the configuration file.
    pub path: PathBuf,
    /// Maximum time to wait for the file lock.
    pub lock_timeout: Duration,
    /// Whether to create missing parent directories on first write.
    pub auto_create: bool,
}

impl StoreConfig {
    /// Creates a new store configuration with default settings.
    ///
    /// Default settings:
    /// - `lock_timeout`: 10s
    /// - `auto_create`: true
    ///
    /// # Examples
    ///
    /// ```
    /// use tanzu_config::StoreConfig;
    ///
    /// let config = StoreConfig::new("/tmp/tanzu/config.yaml");
    /// assert_eq!(config.path.to_str().unwrap(), "/tmp/tanzu/config.yaml");
    /// assert!(config.auto_create);
    /// ```
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            auto_create: true,
        }
    }

    /// Creates a configuration for the default location, with environment
    /// overrides applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined while no
    /// path override is set, or if an override is invalid.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(resolve_config_path()?);
        EnvironmentConfig::apply_overrides(&mut config)?;
        Ok(config)
    }

    /// Sets the lock timeout.
    ///
    /// # Examples
    ///
    /// ```
    /// use tanzu_config::StoreConfig;
    /// use std::time::Duration;
    ///
    /// let config = StoreConfig::new("/tmp/config.yaml")
    ///     .with_lock_timeout(Duration::from_millis(250));
    /// assert_eq!(config.lock_timeout, Duration::from_millis(250));
    /// ```
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub fn with_auto_create(mut self, auto_create: bool) -> Self {
        self.auto_create = auto_create;
        self
    }

    /// Path of the sibling lock file, `<config>.lock`.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

/// Returns the default configuration file path, `~/.config/tanzu/config.yaml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
///
/// # Examples
///
/// ```no_run
/// use tanzu_config::store::default_config_path;
///
/// let path = default_config_path().unwrap();
/// println!("Configuration file: {}", path.display());
/// ```
pub fn default_config_path() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| Error::Validation {
        field: "home_directory".into(),
        message: "Cannot determine home directory".into(),
    })?;
    Ok(home.join(".config").join("tanzu").join("config.yaml"))
}

/// Resolves the configuration file path using the environment or defaults.
///
/// The resolution order is:
/// 1. `$TANZU_CONFIG` if the environment variable is set
/// 2. `~/.config/tanzu/config.yaml` otherwise
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined and
/// `TANZU_CONFIG` is not set.
pub fn resolve_config_path() -> Result<PathBuf> {
    match std::env::var(crate::config::environment::CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => default_config_path(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::{CONFIG_PATH_ENV, LOCK_TIMEOUT_ENV};
    use serial_test::serial;

    #[test]
    fn test_config_new() {
        let config = StoreConfig::new("/tmp/test.yaml");
        assert_eq!(config.path, PathBuf::from("/tmp/test.yaml"));
        assert_eq!(config.lock_timeout, Duration::from_secs(10));
        assert!(config.auto_create);
    }

    #[test]
    fn test_config_builders() {
        let config = StoreConfig::new("/tmp/test.yaml")
            .with_lock_timeout(Duration::from_millis(100))
            .with_auto_create(false);
        assert_eq!(config.lock_timeout, Duration::from_millis(100));
        assert!(!config.auto_create);
    }

    #[test]
    fn test_lock_path() {
        let config = StoreConfig::new("/tmp/tanzu/config.yaml");
        assert_eq!(config.lock_path(), PathBuf::from("/tmp/tanzu/config.yaml.lock"));
    }

    #[test]
    #[serial]
    fn test_default_config_path() {
        // This test requires a resolvable home directory
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with(".config/tanzu/config.yaml"));
        }
    }

    #[test]
    #[serial]
    fn test_resolve_config_path() {
        std::env::set_var(CONFIG_PATH_ENV, "/custom/config.yaml");
        let path = resolve_config_path().unwrap();
        assert_eq!(path, PathBuf::from("/custom/config.yaml"));

        std::env::remove_var(CONFIG_PATH_ENV);
        if let Ok(path) = resolve_config_path() {
            assert!(path.ends_with("config.yaml"));
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(CONFIG_PATH_ENV, "/custom/config.yaml");
        std::env::set_var(LOCK_TIMEOUT_ENV, "1");

        let config = StoreConfig::from_env();

        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var(LOCK_TIMEOUT_ENV);

        let config = config.unwrap();
        assert_eq!(config.path, PathBuf::from("/custom/config.yaml"));
        assert_eq!(config.lock_timeout, Duration::from_secs(1));
    }
}
