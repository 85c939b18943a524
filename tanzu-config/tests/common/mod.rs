//! Common test utilities for integration tests.
//!
//! This module provides helper functions and fixture builders for testing
//! the tanzu-config library.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tanzu_config::{
    ClusterOpts, ConfigStore, Context, ContextKind, GlobalOpts, ManagementClusterOpts, Server,
    ServerKind, StoreConfig, ORG_ID_KEY,
};
use tempfile::TempDir;

/// Kubeconfig fixture with a single Tanzu context.
#[allow(dead_code)]
pub const KUBECONFIG_FIXTURE: &str = include_str!("../fixtures/kubeconfig-1.yaml");

/// A store backed by a temporary directory.
///
/// The directory is removed when the value is dropped.
#[allow(dead_code)]
pub struct TestStore {
    pub dir: TempDir,
    pub store: ConfigStore,
}

#[allow(dead_code)]
impl TestStore {
    /// Creates an empty store in a fresh temporary directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(StoreConfig::new(dir.path().join("config.yaml"))).unwrap();
        Self { dir, store }
    }

    /// Creates a store whose file initially holds `yaml`.
    pub fn with_contents(yaml: &str) -> Self {
        let test = Self::new();
        fs::write(test.store.path(), yaml).unwrap();
        test
    }

    /// Another handle on the same file, as a second library instance would
    /// open it.
    pub fn reopen(&self) -> ConfigStore {
        ConfigStore::open(StoreConfig::new(self.store.path())).unwrap()
    }

    /// The raw file contents.
    pub fn contents(&self) -> String {
        fs::read_to_string(self.store.path()).unwrap()
    }

    /// Copies the kubeconfig fixture into the temporary directory.
    pub fn write_kubeconfig(&self) -> PathBuf {
        let path = self.dir.path().join("kubeconfig");
        fs::write(&path, KUBECONFIG_FIXTURE).unwrap();
        path
    }
}

/// A `tanzu` context with an org-only active resource.
#[allow(dead_code)]
pub fn tanzu_context(name: &str) -> Context {
    Context::new(name, ContextKind::Tanzu)
        .with_cluster_opts(ClusterOpts {
            endpoint: "https://api.tanzu.cloud.vmware.com:443/org/fake-org-id".into(),
            ..Default::default()
        })
        .with_metadata(ORG_ID_KEY, "fake-org-id")
}

/// A kubernetes context for a management cluster.
#[allow(dead_code)]
pub fn mc_context(name: &str) -> Context {
    Context::new(name, ContextKind::Kubernetes).with_cluster_opts(ClusterOpts {
        endpoint: format!("https://{name}.example.com:6443"),
        path: "/home/user/.kube/config".into(),
        context: format!("{name}-admin@{name}"),
        is_management_cluster: true,
        ..Default::default()
    })
}

/// A mission-control context.
#[allow(dead_code)]
pub fn tmc_context(name: &str) -> Context {
    Context::new(name, ContextKind::MissionControl).with_global_opts(GlobalOpts {
        endpoint: format!("{name}.tmc.example.com:443"),
        ..Default::default()
    })
}

/// A legacy management-cluster server.
#[allow(dead_code)]
pub fn mc_server(name: &str) -> Server {
    Server::new(name, ServerKind::ManagementCluster).with_management_cluster_opts(
        ManagementClusterOpts {
            endpoint: format!("https://{name}.example.com:6443"),
            path: "/home/user/.kube/config".into(),
            context: format!("{name}-admin@{name}"),
            ..Default::default()
        },
    )
}

/// A writer that can be handed out several times and read back afterwards.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

#[allow(dead_code)]
impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Script of a fake CLI.
///
/// `context` reports to stderr and exits with `__STATUS__`; `newcommand`
/// reports success to stdout, failure to stderr, and exits with
/// `__NEW_STATUS__`. When `__CUSTOM__` is `_custom_command`, asking for an
/// alternate command line answers `newcommand <args without "context">`.
#[allow(dead_code)]
const FAKE_CLI: &str = r#"#!/bin/bash
# Fake tanzu core binary

context() {
    if [ "__STATUS__" -eq "0" ]; then
        >&2 echo "$@ succeeded"
    else
        >&2 echo "$@ failed"
    fi

    exit __STATUS__
}

newcommand() {
    if [ "__NEW_STATUS__" -eq "0" ]; then
        echo "$@ succeeded"
    else
        >&2 echo "$@ failed"
    fi

    exit __NEW_STATUS__
}

case "$1" in
    __CUSTOM__) shift && shift && echo "newcommand $@";;
    newcommand) $1 "$@";;
    context) $1 "$@";;
    *) cat << EOF
Tanzu Core CLI Fake

Usage:
  tanzu [command]
EOF
       exit 1
       ;;
esac
"#;

/// Writes the fake CLI into `dir` and returns its path.
#[cfg(unix)]
#[allow(dead_code)]
pub fn fake_cli(dir: &Path, status: u8, new_status: u8, custom_command: bool) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let custom = if custom_command {
        tanzu_config::delegate::CUSTOM_COMMAND_NAME
    } else {
        "unused_command"
    };
    let script = FAKE_CLI
        .replace("__NEW_STATUS__", &new_status.to_string())
        .replace("__STATUS__", &status.to_string())
        .replace("__CUSTOM__", custom);

    let path = dir.join("tanzu");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}
