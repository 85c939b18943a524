//! Minimal kubeconfig model.
//!
//! Only the parts needed to resolve a context to its cluster and rewrite the
//! cluster's server URL are typed; users, certificates and everything else
//! are carried through untouched.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// A kubeconfig document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubeConfig {
    /// Schema version, normally `v1`.
    #[serde(rename = "apiVersion", default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    /// Document kind, normally `Config`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// Named clusters.
    #[serde(default)]
    pub clusters: Vec<NamedCluster>,

    /// Named contexts.
    #[serde(default)]
    pub contexts: Vec<NamedContext>,

    /// Context selected by default.
    #[serde(rename = "current-context", default, skip_serializing_if = "String::is_empty")]
    pub current_context: String,

    /// User entries, kept opaque.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<Value>,

    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A named cluster entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    /// Cluster name.
    pub name: String,
    /// Connection details.
    #[serde(default)]
    pub cluster: Cluster,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Cluster connection details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// API server URL.
    #[serde(default)]
    pub server: String,
    /// Certificate data and other fields not modelled here.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A named context entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    /// Context name.
    pub name: String,
    /// The selected cluster and user.
    #[serde(default)]
    pub context: KubeContext,
    /// Fields not modelled here.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// The cluster/user pair a context selects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KubeContext {
    /// Name of the cluster entry.
    #[serde(default)]
    pub cluster: String,
    /// Name of the user entry.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    /// Namespace and other fields not modelled here.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl KubeConfig {
    /// Read and decode a kubeconfig file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPath`] if the file cannot be read and
    /// [`Error::Codec`] if it is not a kubeconfig.
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read kubeconfig: {e}"),
        })?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Looks up a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&NamedContext> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Looks up a cluster by name.
    #[must_use]
    pub fn cluster(&self, name: &str) -> Option<&NamedCluster> {
        self.clusters.iter().find(|c| c.name == name)
    }

    /// Looks up a cluster by name for modification.
    pub fn cluster_mut(&mut self, name: &str) -> Option<&mut NamedCluster> {
        self.clusters.iter_mut().find(|c| c.name == name)
    }

    /// The cluster a context points at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if either the context or its cluster is
    /// missing.
    pub fn cluster_for_context_mut(&mut self, context: &str) -> Result<&mut Cluster> {
        let cluster_name = self
            .context(context)
            .ok_or_else(|| Error::not_found(format!("kubeconfig context {context}")))?
            .context
            .cluster
            .clone();

        self.cluster_mut(&cluster_name)
            .map(|c| &mut c.cluster)
            .ok_or_else(|| Error::not_found(format!("kubeconfig cluster {cluster_name}")))
    }

    /// Encode the kubeconfig as YAML bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Codec`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(self)?.into_bytes())
    }
}
