#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # tanzu-config
//!
//! A library for the client-side configuration shared by every plugin and
//! version of the Tanzu CLI.
//!
//! The configuration file holds named *contexts* (modern endpoint entries),
//! named *servers* (the legacy form older versions still read and write),
//! per-kind current pointers and a metadata block that controls how the two
//! forms are reconciled. Several library versions may operate on the same file
//! at once; every operation runs under an exclusive file lock and rewrites the
//! file atomically, and fields this version does not know are preserved.
//!
//! ## Core Types
//!
//! - [`ConfigStore`] and [`StoreConfig`]: the store and how to open it
//! - [`Context`], [`Server`] and [`ConfigDocument`]: the document model
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use tanzu_config::{ConfigStore, Context, ContextKind, StoreConfig, ORG_ID_KEY};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = ConfigStore::open(StoreConfig::new(dir.path().join("config.yaml"))).unwrap();
//!
//! let ctx = Context::new("my-tanzu", ContextKind::Tanzu).with_metadata(ORG_ID_KEY, "org-1");
//! store.set_context(&ctx, true).unwrap();
//!
//! let active = store.get_tanzu_context_active_resource("my-tanzu").unwrap();
//! assert_eq!(active.org_id, "org-1");
//! assert!(active.project_name.is_empty());
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod kubeconfig;
pub mod logging;
pub mod store;

// Re-export key types at crate root for convenience
pub use config::{
    ActiveResource, ClusterOpts, ConfigDocument, ConfigMetadata, Context, ContextKind, GlobalOpts,
    ManagementClusterOpts, Metadata, PatchStrategy, Server, ServerKind, ORG_ID_KEY,
    PROJECT_NAME_KEY, SPACE_NAME_KEY, USE_UNIFIED_CONFIG_SETTING,
};
pub use delegate::{set_tanzu_context_active_resource, CommandOptions};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use store::{ConfigStore, StoreConfig};
