//! Helpers specific to `tanzu` contexts.

use std::path::Path;

use crate::config::{ActiveResource, Context, ContextKind};
use crate::error::{Error, Result};
use crate::kubeconfig::KubeConfig;

use super::ConfigStore;

/// Server URL of a resource behind a Tanzu endpoint.
///
/// An empty project selects the endpoint itself; an empty space selects the
/// project.
///
/// # Examples
///
/// ```
/// use tanzu_config::store::tanzu_server_url;
///
/// let base = "https://api.example.com/org/o1";
/// assert_eq!(tanzu_server_url(base, "p1", "s1"), format!("{base}/project/p1/space/s1"));
/// assert_eq!(tanzu_server_url(base, "p1", ""), format!("{base}/project/p1"));
/// assert_eq!(tanzu_server_url(base, "", ""), base);
/// ```
#[must_use]
pub fn tanzu_server_url(endpoint: &str, project: &str, space: &str) -> String {
    if project.is_empty() {
        return endpoint.to_string();
    }

    let mut url = format!("{}/project/{project}", endpoint.trim_end_matches('/'));
    if !space.is_empty() {
        url.push_str("/space/");
        url.push_str(space);
    }
    url
}

fn require_tanzu(ctx: &Context) -> Result<()> {
    if ctx.target == ContextKind::Tanzu {
        Ok(())
    } else {
        Err(Error::Type {
            entity: "context".into(),
            expected: ContextKind::Tanzu.to_string(),
        })
    }
}

impl ConfigStore {
    /// Derives a kubeconfig scoped to a project (and optionally a space) of a
    /// `tanzu` context.
    ///
    /// The kubeconfig referenced by the context is read, the cluster behind
    /// its kubeconfig context is pointed at the resource URL, and the
    /// modified document is returned. The file on disk is left untouched.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the context, its kubeconfig context or the
    ///   cluster does not exist
    /// - [`Error::Type`] if the context is not of type `tanzu`
    /// - [`Error::MissingMetadata`] if the context has no cluster options
    /// - [`Error::InvalidPath`] or [`Error::Codec`] if the kubeconfig cannot
    ///   be read
    pub fn get_kubeconfig_for_context(
        &self,
        name: &str,
        project: &str,
        space: &str,
    ) -> Result<Vec<u8>> {
        let ctx = self.get_context(name)?;
        require_tanzu(&ctx)?;

        let opts = ctx.cluster_opts.as_ref().ok_or_else(|| Error::MissingMetadata {
            entity: "context".into(),
            what: "cluster options".into(),
        })?;

        let mut kubeconfig = KubeConfig::read(Path::new(&opts.path))?;
        let cluster = kubeconfig.cluster_for_context_mut(&opts.context)?;
        cluster.server = tanzu_server_url(&opts.endpoint, project, space);

        log::debug!("derived kubeconfig for '{name}' at {}", cluster.server);
        kubeconfig.to_bytes()
    }

    /// Returns the active organization, project and space of a `tanzu`
    /// context.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the context does not exist
    /// - [`Error::Type`] if the context is not of type `tanzu`
    /// - [`Error::MissingMetadata`] if the context carries no Tanzu metadata
    pub fn get_tanzu_context_active_resource(&self, name: &str) -> Result<ActiveResource> {
        self.get_context(name)?.active_resource()
    }
}
