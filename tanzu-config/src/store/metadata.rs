//! Metadata block operations: patch strategies and settings.
//!
//! The `metadata.configMetadata` block is created lazily by the first write.
//! Reads distinguish an absent block, an absent map and an absent key from
//! empty values: all three report [`Error::NotFound`].

use std::collections::BTreeMap;

use crate::config::{ConfigMetadata, Metadata, PatchStrategy, USE_UNIFIED_CONFIG_SETTING};
use crate::error::{Error, Result};

use super::ConfigStore;

fn require_key(field: &str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(Error::Validation {
            field: field.into(),
            message: "Key cannot be empty or only whitespace".into(),
        });
    }
    Ok(())
}

impl ConfigStore {
    /// Returns the whole metadata section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the document has no metadata section.
    pub fn get_metadata(&self) -> Result<Metadata> {
        self.read(|doc, _| doc.metadata.clone().ok_or_else(|| Error::not_found("metadata")))
    }

    /// Returns the config metadata block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the block was never written.
    pub fn get_config_metadata(&self) -> Result<ConfigMetadata> {
        self.read(|doc, _| {
            doc.config_metadata()
                .cloned()
                .ok_or_else(|| Error::not_found("config metadata"))
        })
    }

    /// Returns the configured patch strategies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no patch strategy map was ever written.
    pub fn get_config_metadata_patch_strategy(&self) -> Result<BTreeMap<String, PatchStrategy>> {
        self.read(|doc, _| {
            doc.config_metadata()
                .and_then(|m| m.patch_strategy.clone())
                .ok_or_else(|| Error::not_found("config metadata patch strategy"))
        })
    }

    /// Sets the patch strategy for a `<section>.<field>` key.
    ///
    /// `strategy` is `merge` or `replace`, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty key or an unknown strategy.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tanzu_config::ConfigStore;
    ///
    /// let store = ConfigStore::from_env().unwrap();
    /// store
    ///     .set_config_metadata_patch_strategy("contexts.additionalMetadata", "replace")
    ///     .unwrap();
    /// ```
    pub fn set_config_metadata_patch_strategy(&self, key: &str, strategy: &str) -> Result<()> {
        require_key("patchStrategy", key)?;
        let strategy: PatchStrategy = strategy.parse()?;

        self.update(|doc, _| {
            doc.config_metadata_mut()
                .patch_strategy
                .get_or_insert_with(BTreeMap::new)
                .insert(key.to_string(), strategy);
            Ok(())
        })
    }

    /// Returns all settings; possibly empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no settings map was ever written.
    pub fn get_config_metadata_settings(&self) -> Result<BTreeMap<String, String>> {
        self.read(|doc, _| {
            doc.config_metadata()
                .and_then(|m| m.settings.clone())
                .ok_or_else(|| Error::not_found("config metadata settings"))
        })
    }

    /// Returns the value of one setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the setting is absent.
    pub fn get_config_metadata_setting(&self, key: &str) -> Result<String> {
        self.read(|doc, _| {
            doc.config_metadata()
                .and_then(|m| m.settings.as_ref())
                .and_then(|settings| settings.get(key))
                .cloned()
                .ok_or_else(|| Error::not_found(format!("config metadata setting {key}")))
        })
    }

    /// Sets one setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty key.
    pub fn set_config_metadata_setting(&self, key: &str, value: &str) -> Result<()> {
        require_key("settings", key)?;

        self.update(|doc, _| {
            doc.config_metadata_mut()
                .settings
                .get_or_insert_with(BTreeMap::new)
                .insert(key.to_string(), value.to_string());
            Ok(())
        })?;

        log::debug!("set config metadata setting '{key}'");
        Ok(())
    }

    /// Deletes one setting, leaving the (possibly empty) settings map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the setting is absent.
    pub fn delete_config_metadata_setting(&self, key: &str) -> Result<()> {
        self.update(|doc, _| {
            doc.metadata
                .as_mut()
                .and_then(|m| m.config_metadata.as_mut())
                .and_then(|m| m.settings.as_mut())
                .and_then(|settings| settings.remove(key))
                .map(|_| ())
                .ok_or_else(|| Error::not_found(format!("config metadata setting {key}")))
        })
    }

    /// Whether a setting is enabled, i.e. set to `true` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the setting is absent.
    pub fn is_config_metadata_settings_enabled(&self, key: &str) -> Result<bool> {
        let value = self.get_config_metadata_setting(key)?;
        Ok(value.eq_ignore_ascii_case("true"))
    }

    /// Whether unified-config mode is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the `useUnifiedConfig` setting is absent.
    pub fn use_unified_config(&self) -> Result<bool> {
        self.is_config_metadata_settings_enabled(USE_UNIFIED_CONFIG_SETTING)
    }
}
