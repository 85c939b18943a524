//! Patch-strategy aware merging of upserted entries.
//!
//! When a context or server is written over an existing entry of the same
//! name, the configured patch strategy decides per field whether the incoming
//! value is merged into the stored one or replaces it. Strategies are keyed by
//! `<section>.<field>`, e.g. `contexts.additionalMetadata`.

use std::collections::BTreeMap;

use serde_yaml::Mapping;

use crate::config::schema::{
    ClusterOpts, Context, GlobalOpts, ManagementClusterOpts, PatchStrategy, Server,
};

/// Patch strategies keyed by `<section>.<field>`.
pub type PatchStrategies = BTreeMap<String, PatchStrategy>;

/// Merges incoming entries into stored ones.
///
/// # Examples
///
/// ```
/// use tanzu_config::config::{ConfigMerger, PatchStrategies};
/// use tanzu_config::{ClusterOpts, Context, ContextKind};
///
/// let mut stored = Context::new("dev", ContextKind::Kubernetes).with_cluster_opts(ClusterOpts {
///     endpoint: "https://old".to_string(),
///     ..Default::default()
/// });
/// let incoming = Context::new("dev", ContextKind::Kubernetes);
///
/// ConfigMerger::merge_context(&mut stored, &incoming, &PatchStrategies::new());
/// assert_eq!(stored.cluster_opts.unwrap().endpoint, "https://old");
/// ```
pub struct ConfigMerger;

impl ConfigMerger {
    /// The strategy configured for a `<section>.<field>` key (merge by default).
    #[must_use]
    pub fn strategy_for(strategies: &PatchStrategies, section: &str, field: &str) -> PatchStrategy {
        strategies
            .get(&format!("{section}.{field}"))
            .cloned()
            .unwrap_or_default()
    }

    /// Merge an incoming context into a stored one of the same name.
    ///
    /// # Merging Rules
    ///
    /// - Target kind: always taken from the incoming context
    /// - Option sections: kept when absent in the incoming context, merged
    ///   field-by-field when present
    /// - Additional metadata and unknown fields: merged key by key
    /// - Any field whose strategy is `replace` is taken verbatim from the
    ///   incoming context
    pub fn merge_context(target: &mut Context, source: &Context, strategies: &PatchStrategies) {
        let strategy = |field: &str| Self::strategy_for(strategies, "contexts", field);

        target.target = source.target.clone();

        Self::merge_option(
            &mut target.global_opts,
            &source.global_opts,
            &strategy("globalOpts"),
            Self::merge_global_opts,
        );
        Self::merge_option(
            &mut target.cluster_opts,
            &source.cluster_opts,
            &strategy("clusterOpts"),
            Self::merge_cluster_opts,
        );
        Self::merge_option(
            &mut target.additional_metadata,
            &source.additional_metadata,
            &strategy("additionalMetadata"),
            Self::merge_mapping,
        );
        Self::merge_mapping(&mut target.extra, &source.extra);
    }

    /// Merge an incoming server into a stored one of the same name.
    ///
    /// Follows the same rules as [`ConfigMerger::merge_context`] with
    /// strategies keyed under `servers.`.
    pub fn merge_server(target: &mut Server, source: &Server, strategies: &PatchStrategies) {
        let strategy = |field: &str| Self::strategy_for(strategies, "servers", field);

        target.kind = source.kind.clone();

        Self::merge_option(
            &mut target.global_opts,
            &source.global_opts,
            &strategy("globalOpts"),
            Self::merge_global_opts,
        );
        Self::merge_option(
            &mut target.management_cluster_opts,
            &source.management_cluster_opts,
            &strategy("managementClusterOpts"),
            Self::merge_management_cluster_opts,
        );
        Self::merge_mapping(&mut target.extra, &source.extra);
    }

    fn merge_option<T: Clone>(
        target: &mut Option<T>,
        source: &Option<T>,
        strategy: &PatchStrategy,
        merge: impl Fn(&mut T, &T),
    ) {
        if strategy.is_replace() {
            target.clone_from(source);
            return;
        }

        match (target.as_mut(), source) {
            (_, None) => {}
            (Some(existing), Some(incoming)) => merge(existing, incoming),
            (None, Some(incoming)) => *target = Some(incoming.clone()),
        }
    }

    /// Key-by-key merge; incoming entries overwrite stored ones.
    fn merge_mapping(target: &mut Mapping, source: &Mapping) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }

    fn merge_string(target: &mut String, source: &str) {
        if !source.is_empty() {
            source.clone_into(target);
        }
    }

    fn merge_global_opts(target: &mut GlobalOpts, source: &GlobalOpts) {
        Self::merge_string(&mut target.endpoint, &source.endpoint);
        Self::merge_mapping(&mut target.extra, &source.extra);
    }

    fn merge_cluster_opts(target: &mut ClusterOpts, source: &ClusterOpts) {
        Self::merge_string(&mut target.endpoint, &source.endpoint);
        Self::merge_string(&mut target.path, &source.path);
        Self::merge_string(&mut target.context, &source.context);
        target.is_management_cluster |= source.is_management_cluster;
        Self::merge_mapping(&mut target.extra, &source.extra);
    }

    fn merge_management_cluster_opts(
        target: &mut ManagementClusterOpts,
        source: &ManagementClusterOpts,
    ) {
        Self::merge_string(&mut target.endpoint, &source.endpoint);
        Self::merge_string(&mut target.path, &source.path);
        Self::merge_string(&mut target.context, &source.context);
        Self::merge_mapping(&mut target.extra, &source.extra);
    }
}
