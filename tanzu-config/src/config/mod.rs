//! Configuration document model and the rules that operate on it.
//!
//! This module contains everything that works on an in-memory
//! [`ConfigDocument`] without touching the lock:
//! - the serde schema shared with other library versions
//! - YAML decoding/encoding and atomic persistence
//! - patch-strategy aware merging of upserts
//! - validation of entries and whole documents
//! - reconciliation of legacy servers with modern contexts
//! - environment variable overrides for the store configuration
//!
//! # Examples
//!
//! ```
//! use tanzu_config::config::{ConfigValidator, DocumentLoader, MigrationEngine};
//! use tanzu_config::{Context, ContextKind};
//!
//! let mut doc = DocumentLoader::decode("contexts: []\n").unwrap();
//! let engine = MigrationEngine::from_document(&doc);
//!
//! let ctx = Context::new("dev", ContextKind::Kubernetes);
//! ConfigValidator::validate_context(&ctx).unwrap();
//! engine.upsert_context(&mut doc, &ctx, true);
//! ConfigValidator::validate_document(&doc).unwrap();
//!
//! assert_eq!(doc.current_context[&ContextKind::Kubernetes], "dev");
//! ```

pub mod environment;
pub mod loader;
pub mod merger;
pub mod migration;
pub mod schema;
pub mod validator;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use environment::EnvironmentConfig;
pub use loader::DocumentLoader;
pub use merger::{ConfigMerger, PatchStrategies};
pub use migration::{
    context_from_server, context_kind_for, is_same_entity, server_from_context, server_kind_for,
    MigrationEngine, USE_UNIFIED_CONFIG_SETTING,
};
pub use schema::{
    ActiveResource, ClusterOpts, ConfigDocument, ConfigMetadata, Context, ContextKind, GlobalOpts,
    ManagementClusterOpts, Metadata, PatchStrategy, Server, ServerKind, ORG_ID_KEY,
    PROJECT_NAME_KEY, SPACE_NAME_KEY,
};
pub use validator::ConfigValidator;
