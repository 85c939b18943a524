//! Context operations.

use std::collections::BTreeMap;

use crate::config::{ConfigValidator, Context, ContextKind};
use crate::error::{Error, Result};

use super::ConfigStore;

impl ConfigStore {
    /// Returns a copy of the context named `name`.
    ///
    /// In unified mode a legacy server of the same name is returned in its
    /// modern form when no context exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such context exists.
    pub fn get_context(&self, name: &str) -> Result<Context> {
        self.read(|doc, engine| {
            engine
                .lookup_context(doc, name)
                .ok_or_else(|| Error::not_found(format!("context {name}")))
        })
    }

    /// Inserts or updates a context, optionally making it current for its
    /// kind in the same write.
    ///
    /// An existing entry of the same name is updated according to the
    /// configured patch strategies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the context (or the stored result of
    /// merging it) is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tanzu_config::{ClusterOpts, ConfigStore, Context, ContextKind};
    ///
    /// let store = ConfigStore::from_env().unwrap();
    /// let ctx = Context::new("dev", ContextKind::Kubernetes).with_cluster_opts(ClusterOpts {
    ///     path: "/home/user/.kube/config".to_string(),
    ///     context: "dev-admin".to_string(),
    ///     ..Default::default()
    /// });
    /// store.set_context(&ctx, true).unwrap();
    /// ```
    pub fn set_context(&self, ctx: &Context, set_current: bool) -> Result<()> {
        ConfigValidator::validate_context(ctx)?;

        self.update(|doc, engine| {
            engine.upsert_context(doc, ctx, set_current);
            match doc.context(&ctx.name) {
                Some(stored) => ConfigValidator::validate_context(stored),
                None => Ok(()),
            }
        })?;

        log::debug!("stored context '{}' ({})", ctx.name, ctx.target);
        Ok(())
    }

    /// Deletes a context, clearing any current pointer that referenced it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such context exists.
    pub fn delete_context(&self, name: &str) -> Result<()> {
        self.update(|doc, engine| {
            if engine.remove_context(doc, name) {
                Ok(())
            } else {
                Err(Error::not_found(format!("context {name}")))
            }
        })?;

        log::debug!("deleted context '{name}'");
        Ok(())
    }

    /// Returns the current context of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no context of that kind is current or
    /// the pointer does not resolve.
    pub fn get_current_context(&self, kind: &ContextKind) -> Result<Context> {
        self.read(|doc, engine| {
            let name = engine
                .current_context_name(doc, kind)
                .ok_or_else(|| Error::not_found(format!("current context of type {kind}")))?;

            engine
                .lookup_context(doc, &name)
                .filter(|ctx| &ctx.target == kind)
                .ok_or_else(|| Error::not_found(format!("context {name}")))
        })
    }

    /// Makes an existing context current for its kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such context exists.
    pub fn set_current_context(&self, name: &str) -> Result<()> {
        self.update(|doc, engine| {
            let ctx = engine
                .lookup_context(doc, name)
                .ok_or_else(|| Error::not_found(format!("context {name}")))?;
            engine.upsert_context(doc, &ctx, true);
            Ok(())
        })
    }

    /// Clears the current context of a kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no context of that kind is current.
    pub fn remove_current_context(&self, kind: &ContextKind) -> Result<()> {
        self.update(|doc, engine| {
            if engine.clear_current_context(doc, kind) {
                Ok(())
            } else {
                Err(Error::not_found(format!("current context of type {kind}")))
            }
        })
    }

    /// Returns the name of the current context of every kind that has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn get_all_current_contexts(&self) -> Result<BTreeMap<ContextKind, String>> {
        self.read(|doc, engine| Ok(engine.current_context_names(doc)))
    }

    /// Returns copies of all contexts.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn get_all_contexts(&self) -> Result<Vec<Context>> {
        self.read(|doc, engine| Ok(engine.all_contexts(doc)))
    }

    /// Whether a context named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn context_exists(&self, name: &str) -> Result<bool> {
        self.read(|doc, engine| Ok(engine.lookup_context(doc, name).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ClusterOpts, Context, ContextKind};
    use crate::store::{ConfigStore, StoreConfig};
    use tempfile::{tempdir, TempDir};

    fn store() -> (TempDir, ConfigStore) {
        let dir = tempdir().unwrap();
        let store = ConfigStore::open(StoreConfig::new(dir.path().join("config.yaml"))).unwrap();
        (dir, store)
    }

    #[test]
    fn test_set_get_current() {
        let (_dir, store) = store();
        let ctx = Context::new("dev", ContextKind::Kubernetes).with_cluster_opts(ClusterOpts {
            endpoint: "https://dev".into(),
            ..Default::default()
        });

        store.set_context(&ctx, true).unwrap();

        assert_eq!(store.get_context("dev").unwrap(), ctx);
        assert_eq!(store.get_current_context(&ContextKind::Kubernetes).unwrap(), ctx);
        assert!(store
            .get_current_context(&ContextKind::Tanzu)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_clears_current() {
        let (_dir, store) = store();
        store
            .set_context(&Context::new("dev", ContextKind::Kubernetes), true)
            .unwrap();

        store.delete_context("dev").unwrap();

        assert!(store.get_context("dev").unwrap_err().is_not_found());
        assert!(store
            .get_current_context(&ContextKind::Kubernetes)
            .unwrap_err()
            .is_not_found());
        assert!(store.delete_context("dev").unwrap_err().is_not_found());
    }

    #[test]
    fn test_invalid_name_rejected() {
        let (_dir, store) = store();
        let err = store
            .set_context(&Context::new("", ContextKind::Kubernetes), false)
            .unwrap_err();
        assert!(err.to_string().contains("validation error"));
    }

    #[test]
    fn test_current_pointer_management() {
        let (_dir, store) = store();
        store
            .set_context(&Context::new("a", ContextKind::Kubernetes), false)
            .unwrap();
        store
            .set_context(&Context::new("b", ContextKind::Tanzu), false)
            .unwrap();

        store.set_current_context("a").unwrap();
        store.set_current_context("b").unwrap();
        let current = store.get_all_current_contexts().unwrap();
        assert_eq!(current.len(), 2);
        assert_eq!(current[&ContextKind::Tanzu], "b");

        store.remove_current_context(&ContextKind::Tanzu).unwrap();
        assert!(store
            .remove_current_context(&ContextKind::Tanzu)
            .unwrap_err()
            .is_not_found());
        assert!(store.set_current_context("missing").unwrap_err().is_not_found());

        assert_eq!(store.get_all_contexts().unwrap().len(), 2);
        assert!(store.context_exists("a").unwrap());
        assert!(!store.context_exists("c").unwrap());
    }
}
