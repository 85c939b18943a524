//! The configuration store.
//!
//! [`ConfigStore`] is a handle on one configuration file. It holds no document
//! state between calls: every operation takes the file lock, reloads the
//! file, and (for mutations) validates and atomically rewrites it before the
//! lock is released. Entities returned by reads are copies.
//!
//! Operations are grouped by concern:
//! - contexts and current-context pointers (`contexts.rs`)
//! - legacy servers and the current-server pointer (`servers.rs`)
//! - the metadata block: patch strategies and settings (`metadata.rs`)
//! - `tanzu` context helpers: kubeconfig derivation and active resource
//!   (`tanzu.rs`)
//!
//! # Examples
//!
//! ```no_run
//! use tanzu_config::{ConfigStore, Context, ContextKind, StoreConfig};
//!
//! let store = ConfigStore::open(StoreConfig::new("/tmp/tanzu/config.yaml")).unwrap();
//!
//! store.set_context(&Context::new("dev", ContextKind::Kubernetes), true).unwrap();
//! let current = store.get_current_context(&ContextKind::Kubernetes).unwrap();
//! assert_eq!(current.name, "dev");
//! ```

mod config;
mod contexts;
pub mod lock;
mod metadata;
mod servers;
mod tanzu;

use std::path::Path;

pub use config::{default_config_path, resolve_config_path, StoreConfig, DEFAULT_LOCK_TIMEOUT};
pub use lock::FileLock;
pub use tanzu::tanzu_server_url;

use crate::config::{ConfigDocument, ConfigValidator, DocumentLoader, MigrationEngine};
use crate::error::Result;

/// A handle on a configuration file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    config: StoreConfig,
}

impl ConfigStore {
    /// Opens a store with the given configuration.
    ///
    /// This function will create the parent directory if `auto_create` is
    /// enabled. The file itself is created by the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if config.auto_create && !config.path.exists() {
            if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(Self { config })
    }

    /// Opens the store at the default location, honouring environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// See [`StoreConfig::from_env`] and [`ConfigStore::open`].
    pub fn from_env() -> Result<Self> {
        Self::open(StoreConfig::from_env()?)
    }

    /// The configuration this store was opened with.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// A snapshot of the whole document as currently on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be acquired or the file cannot be
    /// decoded.
    pub fn load(&self) -> Result<ConfigDocument> {
        self.read(|doc, _| Ok(doc.clone()))
    }

    fn lock(&self) -> Result<FileLock> {
        let path = self.config.lock_path();
        if self.config.auto_create {
            FileLock::acquire_creating_dir(&path, self.config.lock_timeout)
        } else {
            FileLock::acquire(&path, self.config.lock_timeout)
        }
    }

    /// Run `f` against a freshly loaded document under the lock.
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&ConfigDocument, &MigrationEngine) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.lock()?;
        let doc = DocumentLoader::load_file(&self.config.path)?;
        let engine = MigrationEngine::from_document(&doc);
        f(&doc, &engine)
    }

    /// Load, mutate, validate and rewrite the document under the lock.
    ///
    /// Nothing is written when `f` fails or leaves the document unchanged.
    pub(crate) fn update<T>(
        &self,
        f: impl FnOnce(&mut ConfigDocument, &MigrationEngine) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.lock()?;
        let original = DocumentLoader::load_file(&self.config.path)?;
        let engine = MigrationEngine::from_document(&original);

        let mut doc = original.clone();
        engine.normalize(&mut doc);
        let value = f(&mut doc, &engine)?;

        if doc != original {
            ConfigValidator::validate_document(&doc)?;
            DocumentLoader::save_file(&self.config.path, &doc)?;
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Context, ContextKind};
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let store = ConfigStore::open(StoreConfig::new(&path)).unwrap();
        assert!(path.parent().unwrap().exists());
        assert!(!path.exists());
        assert_eq!(store.path(), path);
    }

    #[test]
    fn test_read_of_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(StoreConfig::new(dir.path().join("config.yaml"))).unwrap();
        assert_eq!(store.load().unwrap(), ConfigDocument::default());
    }

    #[test]
    fn test_failed_update_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = ConfigStore::open(StoreConfig::new(&path)).unwrap();

        let result: Result<()> = store.update(|doc, _| {
            doc.contexts.push(Context::new("dev", ContextKind::Kubernetes));
            Err(Error::not_found("anything"))
        });
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_document_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = ConfigStore::open(StoreConfig::new(&path)).unwrap();

        let result = store.update(|doc, _| {
            doc.current_context.insert(ContextKind::Tanzu, "missing".into());
            Ok(())
        });
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let store = ConfigStore::open(StoreConfig::new(&path)).unwrap();

        store
            .update(|doc, engine| {
                engine.upsert_context(doc, &Context::new("dev", ContextKind::Kubernetes), true);
                Ok(())
            })
            .unwrap();

        let doc = DocumentLoader::load_file(&path).unwrap();
        assert_eq!(doc.contexts.len(), 1);
        assert_eq!(doc.current_context[&ContextKind::Kubernetes], "dev");
    }
}
