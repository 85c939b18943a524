//! Configuration document schema.
//!
//! This module defines the on-disk structure shared by every version of the
//! library: contexts, legacy servers, current pointers and the metadata block.
//! Each record carries an `extra` mapping that captures fields this version
//! does not know about, so they are written back unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Additional-metadata key holding the organization id of a `tanzu` context.
pub const ORG_ID_KEY: &str = "tanzuOrgID";
/// Additional-metadata key holding the active project of a `tanzu` context.
pub const PROJECT_NAME_KEY: &str = "tanzuProjectName";
/// Additional-metadata key holding the active space of a `tanzu` context.
pub const SPACE_NAME_KEY: &str = "tanzuSpaceName";

/// Target kind of a context.
///
/// Names are matched exactly. Kinds written by other library versions that
/// this version does not know, including other spellings of known kinds, are
/// kept verbatim in [`ContextKind::Other`] so they are written back unchanged.
///
/// # Examples
///
/// ```
/// use tanzu_config::ContextKind;
///
/// assert_eq!(ContextKind::from("mission-control".to_string()), ContextKind::MissionControl);
/// assert_eq!(ContextKind::Tanzu.as_str(), "tanzu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextKind {
    /// A Kubernetes cluster endpoint.
    Kubernetes,
    /// A mission-control (SaaS management) endpoint.
    MissionControl,
    /// A resource-scoped Tanzu platform endpoint.
    Tanzu,
    /// A kind unknown to this version.
    Other(String),
}

impl ContextKind {
    /// The serialized name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kubernetes => "kubernetes",
            Self::MissionControl => "mission-control",
            Self::Tanzu => "tanzu",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for ContextKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "kubernetes" => Self::Kubernetes,
            "mission-control" => Self::MissionControl,
            "tanzu" => Self::Tanzu,
            _ => Self::Other(value),
        }
    }
}

impl From<ContextKind> for String {
    fn from(kind: ContextKind) -> Self {
        match kind {
            ContextKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a legacy server entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerKind {
    /// A management cluster reached through a kubeconfig.
    ManagementCluster,
    /// A global (SaaS) endpoint.
    Global,
    /// A type unknown to this version.
    Other(String),
}

impl ServerKind {
    /// The serialized name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ManagementCluster => "managementcluster",
            Self::Global => "global",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for ServerKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "managementcluster" => Self::ManagementCluster,
            "global" => Self::Global,
            _ => Self::Other(value),
        }
    }
}

impl From<ServerKind> for String {
    fn from(kind: ServerKind) -> Self {
        match kind {
            ServerKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint options of a global (SaaS) context or server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalOpts {
    /// Endpoint URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Fields unknown to this version (authentication blocks and the like).
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Cluster access options of a context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOpts {
    /// Endpoint URL of the cluster or platform.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Path to the kubeconfig file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Name of the context inside the kubeconfig file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    /// Whether the cluster is a management cluster.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_management_cluster: bool,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// Management-cluster options of a legacy server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagementClusterOpts {
    /// Endpoint URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    /// Path to the kubeconfig file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Name of the context inside the kubeconfig file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// A named, modern-form endpoint configuration entry.
///
/// # Examples
///
/// ```
/// use tanzu_config::{Context, ContextKind, ClusterOpts};
///
/// let ctx = Context::new("dev", ContextKind::Kubernetes).with_cluster_opts(ClusterOpts {
///     endpoint: "https://dev.example.com".to_string(),
///     ..Default::default()
/// });
/// assert_eq!(ctx.name, "dev");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    /// Unique name.
    pub name: String,

    /// Target kind.
    pub target: ContextKind,

    /// Global endpoint options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_opts: Option<GlobalOpts>,

    /// Cluster access options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_opts: Option<ClusterOpts>,

    /// Free-form metadata (org id, project and space of `tanzu` contexts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_metadata: Option<Mapping>,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Context {
    /// Creates a context with no options.
    #[must_use]
    pub fn new(name: impl Into<String>, target: ContextKind) -> Self {
        Self {
            name: name.into(),
            target,
            global_opts: None,
            cluster_opts: None,
            additional_metadata: None,
            extra: Mapping::new(),
        }
    }

    /// Sets the cluster options.
    #[must_use]
    pub fn with_cluster_opts(mut self, opts: ClusterOpts) -> Self {
        self.cluster_opts = Some(opts);
        self
    }

    /// Sets the global options.
    #[must_use]
    pub fn with_global_opts(mut self, opts: GlobalOpts) -> Self {
        self.global_opts = Some(opts);
        self
    }

    /// Adds a string entry to the additional metadata, creating the map if needed.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Inserts or overwrites a string entry in the additional metadata.
    pub fn set_metadata(&mut self, key: &str, value: impl Into<String>) {
        self.additional_metadata
            .get_or_insert_with(Mapping::new)
            .insert(Value::from(key), Value::from(value.into()));
    }

    /// Returns a string entry of the additional metadata.
    ///
    /// Non-string values written by other tools are ignored.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.additional_metadata
            .as_ref()
            .and_then(|map| map.get(key))
            .and_then(Value::as_str)
    }

    /// Reads the active resource of a `tanzu` context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Type`] for other kinds and [`Error::MissingMetadata`]
    /// when the metadata map is absent or lacks the org id.
    pub fn active_resource(&self) -> Result<ActiveResource> {
        if self.target != ContextKind::Tanzu {
            return Err(Error::Type {
                entity: "context".into(),
                expected: ContextKind::Tanzu.to_string(),
            });
        }

        let org_id = self.metadata_str(ORG_ID_KEY).ok_or_else(|| Error::MissingMetadata {
            entity: "context".into(),
            what: "Tanzu metadata".into(),
        })?;

        Ok(ActiveResource {
            org_id: org_id.to_string(),
            project_name: self.metadata_str(PROJECT_NAME_KEY).unwrap_or_default().to_string(),
            space_name: self.metadata_str(SPACE_NAME_KEY).unwrap_or_default().to_string(),
        })
    }
}

/// The currently selected organization, project and space of a `tanzu` context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveResource {
    /// Organization id; always present.
    pub org_id: String,
    /// Project name; empty when the org itself is active.
    pub project_name: String,
    /// Space name; empty unless a space inside the project is active.
    pub space_name: String,
}

/// A named, legacy-form endpoint entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Unique name.
    pub name: String,

    /// Server type.
    #[serde(rename = "type")]
    pub kind: ServerKind,

    /// Global endpoint options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_opts: Option<GlobalOpts>,

    /// Management-cluster options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management_cluster_opts: Option<ManagementClusterOpts>,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Server {
    /// Creates a server with no options.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ServerKind) -> Self {
        Self {
            name: name.into(),
            kind,
            global_opts: None,
            management_cluster_opts: None,
            extra: Mapping::new(),
        }
    }

    /// Sets the management-cluster options.
    #[must_use]
    pub fn with_management_cluster_opts(mut self, opts: ManagementClusterOpts) -> Self {
        self.management_cluster_opts = Some(opts);
        self
    }

    /// Sets the global options.
    #[must_use]
    pub fn with_global_opts(mut self, opts: GlobalOpts) -> Self {
        self.global_opts = Some(opts);
        self
    }
}

/// Merge policy applied when an upsert only carries part of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatchStrategy {
    /// Absent sections keep their stored value; mappings merge key by key.
    #[default]
    Merge,
    /// The incoming field replaces the stored one, absence included.
    Replace,
    /// Any other stored spelling, kept verbatim. Applied as `replace` when it
    /// spells `replace` in another case, as `merge` otherwise.
    Other(String),
}

impl PatchStrategy {
    /// Whether the strategy replaces fields wholesale.
    #[must_use]
    pub fn is_replace(&self) -> bool {
        match self {
            Self::Replace => true,
            Self::Other(value) => value.eq_ignore_ascii_case("replace"),
            Self::Merge => false,
        }
    }
}

impl From<String> for PatchStrategy {
    fn from(value: String) -> Self {
        match value.as_str() {
            "merge" => Self::Merge,
            "replace" => Self::Replace,
            _ => Self::Other(value),
        }
    }
}

impl From<PatchStrategy> for String {
    fn from(strategy: PatchStrategy) -> Self {
        match strategy {
            PatchStrategy::Merge => "merge".to_string(),
            PatchStrategy::Replace => "replace".to_string(),
            PatchStrategy::Other(value) => value,
        }
    }
}

impl FromStr for PatchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "merge" => Ok(Self::Merge),
            "replace" => Ok(Self::Replace),
            _ => Err(Error::Validation {
                field: "patchStrategy".into(),
                message: format!("unknown patch strategy '{s}' (expected merge or replace)"),
            }),
        }
    }
}

/// The `configMetadata` block: patch strategies and settings flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMetadata {
    /// Patch strategy per `<section>.<field>` key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_strategy: Option<BTreeMap<String, PatchStrategy>>,

    /// Settings flags. An empty map is distinct from an absent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<BTreeMap<String, String>>,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// The document-level `metadata` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Config metadata; created lazily on first write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_metadata: Option<ConfigMetadata>,

    /// Fields unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

/// The root configuration document.
///
/// # Examples
///
/// ```
/// use tanzu_config::ConfigDocument;
///
/// let doc = ConfigDocument::default();
/// assert!(doc.contexts.is_empty());
/// assert!(doc.metadata.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Modern context entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,

    /// Current context name per kind.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub current_context: BTreeMap<ContextKind, String>,

    /// Legacy server entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Legacy current server name.
    #[serde(default, rename = "current", skip_serializing_if = "Option::is_none")]
    pub current_server: Option<String>,

    /// Metadata section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Top-level sections unknown to this version.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ConfigDocument {
    /// Looks up a context by name.
    #[must_use]
    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    /// Looks up a server by name.
    #[must_use]
    pub fn server(&self, name: &str) -> Option<&Server> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// The config metadata block, if it was ever written.
    #[must_use]
    pub fn config_metadata(&self) -> Option<&ConfigMetadata> {
        self.metadata.as_ref()?.config_metadata.as_ref()
    }

    /// The config metadata block, created on demand.
    pub fn config_metadata_mut(&mut self) -> &mut ConfigMetadata {
        self.metadata
            .get_or_insert_with(Metadata::default)
            .config_metadata
            .get_or_insert_with(ConfigMetadata::default)
    }
}
