//! Reconciliation of legacy servers and modern contexts.
//!
//! Older library versions only know servers, newer ones write contexts. The
//! [`MigrationEngine`] reads the metadata block of a loaded document and
//! decides how the two namespaces relate:
//!
//! - a server and a context are the same logical entity iff
//!   [`is_same_entity`] holds for them;
//! - in unified mode (`useUnifiedConfig: "true"`) writes are mirrored onto the
//!   counterpart and reads fall back to it;
//! - otherwise the namespaces are independent.

use std::collections::{BTreeMap, HashSet};

use crate::config::merger::{ConfigMerger, PatchStrategies};
use crate::config::schema::{
    ClusterOpts, ConfigDocument, Context, ContextKind, ManagementClusterOpts, Server, ServerKind,
};

/// Reserved setting key that switches unified-config mode on.
pub const USE_UNIFIED_CONFIG_SETTING: &str = "useUnifiedConfig";

/// The context kind a legacy server kind corresponds to.
#[must_use]
pub fn context_kind_for(kind: &ServerKind) -> Option<ContextKind> {
    match kind {
        ServerKind::ManagementCluster => Some(ContextKind::Kubernetes),
        ServerKind::Global => Some(ContextKind::MissionControl),
        ServerKind::Other(_) => None,
    }
}

/// The legacy server kind a context kind corresponds to.
///
/// `tanzu` contexts have no legacy form.
#[must_use]
pub fn server_kind_for(kind: &ContextKind) -> Option<ServerKind> {
    match kind {
        ContextKind::Kubernetes => Some(ServerKind::ManagementCluster),
        ContextKind::MissionControl => Some(ServerKind::Global),
        ContextKind::Tanzu | ContextKind::Other(_) => None,
    }
}

/// Whether a server and a context describe the same logical entity.
///
/// # Examples
///
/// ```
/// use tanzu_config::config::is_same_entity;
/// use tanzu_config::{Context, ContextKind, Server, ServerKind};
///
/// let server = Server::new("prod", ServerKind::ManagementCluster);
/// assert!(is_same_entity(&server, &Context::new("prod", ContextKind::Kubernetes)));
/// assert!(!is_same_entity(&server, &Context::new("prod", ContextKind::MissionControl)));
/// assert!(!is_same_entity(&server, &Context::new("dev", ContextKind::Kubernetes)));
/// ```
#[must_use]
pub fn is_same_entity(server: &Server, context: &Context) -> bool {
    server.name == context.name
        && context_kind_for(&server.kind).is_some_and(|kind| kind == context.target)
}

/// Derive the legacy form of a context, if it has one.
#[must_use]
pub fn server_from_context(ctx: &Context) -> Option<Server> {
    let kind = server_kind_for(&ctx.target)?;
    let mut server = Server::new(ctx.name.clone(), kind.clone());

    match kind {
        ServerKind::ManagementCluster => {
            server.management_cluster_opts =
                ctx.cluster_opts.as_ref().map(|opts| ManagementClusterOpts {
                    endpoint: opts.endpoint.clone(),
                    path: opts.path.clone(),
                    context: opts.context.clone(),
                    ..Default::default()
                });
        }
        ServerKind::Global | ServerKind::Other(_) => {
            server.global_opts.clone_from(&ctx.global_opts);
        }
    }

    Some(server)
}

/// Derive the modern form of a legacy server, if it has one.
#[must_use]
pub fn context_from_server(server: &Server) -> Option<Context> {
    let kind = context_kind_for(&server.kind)?;
    let mut ctx = Context::new(server.name.clone(), kind.clone());

    match kind {
        ContextKind::Kubernetes => {
            ctx.cluster_opts = server
                .management_cluster_opts
                .as_ref()
                .map(|opts| ClusterOpts {
                    endpoint: opts.endpoint.clone(),
                    path: opts.path.clone(),
                    context: opts.context.clone(),
                    is_management_cluster: true,
                    ..Default::default()
                });
        }
        _ => ctx.global_opts.clone_from(&server.global_opts),
    }

    Some(ctx)
}

/// Interpretation rules derived from a document's metadata block.
#[derive(Debug, Clone, Default)]
pub struct MigrationEngine {
    unified: bool,
    strategies: PatchStrategies,
}

impl MigrationEngine {
    /// Build the engine from the metadata of a freshly loaded document.
    #[must_use]
    pub fn from_document(doc: &ConfigDocument) -> Self {
        let metadata = doc.config_metadata();
        let unified = metadata
            .and_then(|m| m.settings.as_ref())
            .and_then(|settings| settings.get(USE_UNIFIED_CONFIG_SETTING))
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));
        let strategies = metadata
            .and_then(|m| m.patch_strategy.clone())
            .unwrap_or_default();

        Self {
            unified,
            strategies,
        }
    }

    /// Whether unified-config mode is active.
    #[must_use]
    pub const fn is_unified(&self) -> bool {
        self.unified
    }

    /// Patch strategies configured in the document.
    #[must_use]
    pub const fn strategies(&self) -> &PatchStrategies {
        &self.strategies
    }

    /// Repair what other versions may have left behind before a write:
    /// duplicate names (first entry wins) and dangling current pointers.
    pub fn normalize(&self, doc: &mut ConfigDocument) {
        let mut seen = HashSet::new();
        doc.contexts.retain(|ctx| {
            let first = seen.insert(ctx.name.clone());
            if !first {
                log::warn!("dropping duplicate context entry '{}'", ctx.name);
            }
            first
        });

        let mut seen = HashSet::new();
        doc.servers.retain(|server| {
            let first = seen.insert(server.name.clone());
            if !first {
                log::warn!("dropping duplicate server entry '{}'", server.name);
            }
            first
        });

        let contexts = &doc.contexts;
        doc.current_context.retain(|kind, name| {
            let valid = contexts.iter().any(|c| &c.name == name && &c.target == kind);
            if !valid {
                log::warn!("clearing dangling current {kind} context '{name}'");
            }
            valid
        });

        let dangling = doc
            .current_server
            .as_deref()
            .is_some_and(|name| doc.server(name).is_none());
        if let Some(name) = dangling.then(|| doc.current_server.take()).flatten() {
            log::warn!("clearing dangling current server '{name}'");
        }
    }

    /// Find a context, falling back to the legacy form in unified mode.
    #[must_use]
    pub fn lookup_context(&self, doc: &ConfigDocument, name: &str) -> Option<Context> {
        doc.context(name).cloned().or_else(|| {
            self.unified
                .then(|| doc.server(name).and_then(context_from_server))
                .flatten()
        })
    }

    /// Find a server, falling back to the modern form in unified mode.
    #[must_use]
    pub fn lookup_server(&self, doc: &ConfigDocument, name: &str) -> Option<Server> {
        doc.server(name).cloned().or_else(|| {
            self.unified
                .then(|| doc.context(name).and_then(server_from_context))
                .flatten()
        })
    }

    /// Current context name of a kind, falling back to the legacy pointer in
    /// unified mode.
    #[must_use]
    pub fn current_context_name(&self, doc: &ConfigDocument, kind: &ContextKind) -> Option<String> {
        if let Some(name) = doc.current_context.get(kind) {
            return Some(name.clone());
        }
        if !self.unified {
            return None;
        }
        let name = doc.current_server.as_ref()?;
        let server = doc.server(name)?;
        (context_kind_for(&server.kind).as_ref() == Some(kind)).then(|| name.clone())
    }

    /// All current context pointers, with the legacy pointer filled in for
    /// its kind in unified mode.
    #[must_use]
    pub fn current_context_names(&self, doc: &ConfigDocument) -> BTreeMap<ContextKind, String> {
        let mut current = doc.current_context.clone();
        if self.unified {
            if let Some(server) = doc.current_server.as_deref().and_then(|n| doc.server(n)) {
                if let Some(kind) = context_kind_for(&server.kind) {
                    current.entry(kind).or_insert_with(|| server.name.clone());
                }
            }
        }
        current
    }

    /// Name of the current server, falling back to the current kubernetes or
    /// mission-control context in unified mode. A context whose name is taken
    /// by a server of another kind is skipped.
    #[must_use]
    pub fn current_server_name(&self, doc: &ConfigDocument) -> Option<String> {
        if let Some(name) = &doc.current_server {
            return Some(name.clone());
        }
        if !self.unified {
            return None;
        }
        [ContextKind::Kubernetes, ContextKind::MissionControl]
            .iter()
            .find_map(|kind| {
                let ctx = doc.context(doc.current_context.get(kind)?)?;
                Self::server_slot_free(doc, ctx).then(|| ctx.name.clone())
            })
    }

    /// Every context, including the modern form of legacy-only servers in
    /// unified mode.
    #[must_use]
    pub fn all_contexts(&self, doc: &ConfigDocument) -> Vec<Context> {
        let mut contexts = doc.contexts.clone();
        if self.unified {
            contexts.extend(
                doc.servers
                    .iter()
                    .filter(|s| doc.context(&s.name).is_none())
                    .filter_map(context_from_server),
            );
        }
        contexts
    }

    /// Every server, including the legacy form of modern-only contexts in
    /// unified mode.
    #[must_use]
    pub fn all_servers(&self, doc: &ConfigDocument) -> Vec<Server> {
        let mut servers = doc.servers.clone();
        if self.unified {
            servers.extend(
                doc.contexts
                    .iter()
                    .filter(|c| doc.server(&c.name).is_none())
                    .filter_map(server_from_context),
            );
        }
        servers
    }

    /// Clear the current context of a kind. Returns whether a pointer was
    /// cleared; in unified mode the matching legacy pointer goes too.
    pub fn clear_current_context(&self, doc: &mut ConfigDocument, kind: &ContextKind) -> bool {
        let removed = doc.current_context.remove(kind);

        let legacy = self.unified
            && doc
                .current_server
                .as_deref()
                .and_then(|name| doc.server(name))
                .is_some_and(|s| {
                    context_kind_for(&s.kind).as_ref() == Some(kind)
                        && removed.as_ref().map_or(true, |name| *name == s.name)
                });
        if legacy {
            doc.current_server = None;
        }

        removed.is_some() || legacy
    }

    /// Clear the legacy current server. Returns whether a pointer was
    /// cleared; in unified mode the matching context pointer goes too.
    pub fn clear_current_server(&self, doc: &mut ConfigDocument) -> bool {
        let Some(name) = doc.current_server.take() else {
            return false;
        };

        if self.unified {
            let kind = doc.server(&name).and_then(|s| context_kind_for(&s.kind));
            if let Some(kind) = kind {
                if doc.current_context.get(&kind) == Some(&name) {
                    doc.current_context.remove(&kind);
                }
            }
        }

        true
    }

    /// Upsert a context (and its legacy form in unified mode).
    pub fn upsert_context(&self, doc: &mut ConfigDocument, ctx: &Context, set_current: bool) {
        self.apply_context(doc, ctx);
        if set_current {
            doc.current_context.insert(ctx.target.clone(), ctx.name.clone());
        }

        if !self.unified {
            return;
        }
        if !Self::server_slot_free(doc, ctx) {
            log::warn!(
                "not mirroring context '{}': a server of another kind has that name",
                ctx.name
            );
            return;
        }
        if let Some(server) = server_from_context(ctx) {
            self.apply_server(doc, &server);
            if set_current {
                doc.current_server = Some(server.name);
            }
        }
    }

    /// Upsert a server (and its modern form in unified mode).
    pub fn upsert_server(&self, doc: &mut ConfigDocument, server: &Server, set_current: bool) {
        self.apply_server(doc, server);
        if set_current {
            doc.current_server = Some(server.name.clone());
        }

        if !self.unified {
            return;
        }
        if !Self::context_slot_free(doc, server) {
            log::warn!(
                "not mirroring server '{}': a context of another kind has that name",
                server.name
            );
            return;
        }
        if let Some(ctx) = context_from_server(server) {
            self.apply_context(doc, &ctx);
            if set_current {
                doc.current_context.insert(ctx.target, ctx.name);
            }
        }
    }

    /// Remove a context and clear pointers to it. Returns whether anything
    /// was removed; in unified mode the legacy counterpart goes too.
    pub fn remove_context(&self, doc: &mut ConfigDocument, name: &str) -> bool {
        let removed = Self::remove_context_entry(doc, name);

        let counterpart = self.unified
            && doc
                .server(name)
                .is_some_and(|s| match &removed {
                    Some(ctx) => is_same_entity(s, ctx),
                    None => context_kind_for(&s.kind).is_some(),
                });
        if counterpart {
            Self::remove_server_entry(doc, name);
        }

        removed.is_some() || counterpart
    }

    /// Remove a server and clear the pointer to it. Returns whether anything
    /// was removed; in unified mode the modern counterpart goes too.
    pub fn remove_server(&self, doc: &mut ConfigDocument, name: &str) -> bool {
        let removed = Self::remove_server_entry(doc, name);

        let counterpart = self.unified
            && doc
                .context(name)
                .is_some_and(|c| match &removed {
                    Some(server) => is_same_entity(server, c),
                    None => server_kind_for(&c.target).is_some(),
                });
        if counterpart {
            Self::remove_context_entry(doc, name);
        }

        removed.is_some() || counterpart
    }

    /// No server holds the context's name, or the one that does is its
    /// legacy form.
    fn server_slot_free(doc: &ConfigDocument, ctx: &Context) -> bool {
        doc.server(&ctx.name).map_or(true, |s| is_same_entity(s, ctx))
    }

    fn context_slot_free(doc: &ConfigDocument, server: &Server) -> bool {
        doc.context(&server.name).map_or(true, |c| is_same_entity(server, c))
    }

    fn apply_context(&self, doc: &mut ConfigDocument, ctx: &Context) {
        let Some(existing) = doc.contexts.iter_mut().find(|c| c.name == ctx.name) else {
            doc.contexts.push(ctx.clone());
            return;
        };

        // a pointer must never reference an entry of another kind
        if existing.target != ctx.target
            && doc.current_context.get(&existing.target) == Some(&ctx.name)
        {
            doc.current_context.remove(&existing.target);
        }
        ConfigMerger::merge_context(existing, ctx, &self.strategies);
    }

    fn apply_server(&self, doc: &mut ConfigDocument, server: &Server) {
        match doc.servers.iter_mut().find(|s| s.name == server.name) {
            Some(existing) => ConfigMerger::merge_server(existing, server, &self.strategies),
            None => doc.servers.push(server.clone()),
        }
    }

    fn remove_context_entry(doc: &mut ConfigDocument, name: &str) -> Option<Context> {
        let index = doc.contexts.iter().position(|c| c.name == name)?;
        let removed = doc.contexts.remove(index);
        if doc.current_context.get(&removed.target).map(String::as_str) == Some(name) {
            doc.current_context.remove(&removed.target);
        }
        Some(removed)
    }

    fn remove_server_entry(doc: &mut ConfigDocument, name: &str) -> Option<Server> {
        let index = doc.servers.iter().position(|s| s.name == name)?;
        let removed = doc.servers.remove(index);
        if doc.current_server.as_deref() == Some(name) {
            doc.current_server = None;
        }
        Some(removed)
    }
}
