//! Property-based tests for the document model.

use super::loader::DocumentLoader;
use super::merger::{ConfigMerger, PatchStrategies};
use super::migration::{is_same_entity, server_from_context, MigrationEngine};
use super::schema::{
    ClusterOpts, ConfigDocument, Context, ContextKind, GlobalOpts, PatchStrategy, Server,
    ServerKind,
};
use proptest::prelude::*;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

fn context_kind_strategy() -> impl Strategy<Value = ContextKind> {
    prop_oneof![
        Just(ContextKind::Kubernetes),
        Just(ContextKind::MissionControl),
        Just(ContextKind::Tanzu),
    ]
}

fn cluster_opts_strategy() -> impl Strategy<Value = ClusterOpts> {
    ("[a-z]{0,10}", "[a-z/]{0,12}", "[a-z]{0,8}", any::<bool>()).prop_map(
        |(host, path, context, is_management_cluster)| ClusterOpts {
            endpoint: if host.is_empty() {
                host
            } else {
                format!("https://{host}.example.com")
            },
            path,
            context,
            is_management_cluster,
            ..Default::default()
        },
    )
}

// Strategy for generating contexts with optional sections
fn context_strategy() -> impl Strategy<Value = Context> {
    (
        name_strategy(),
        context_kind_strategy(),
        prop::option::of(cluster_opts_strategy()),
        prop::option::of("[a-z]{1,10}"),
        prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 0..4),
    )
        .prop_map(|(name, kind, cluster, global, metadata)| {
            let mut ctx = Context::new(name, kind);
            ctx.cluster_opts = cluster;
            ctx.global_opts = global.map(|endpoint| GlobalOpts {
                endpoint,
                ..Default::default()
            });
            for (key, value) in metadata {
                ctx.set_metadata(&key, value);
            }
            ctx
        })
}

fn document_strategy() -> impl Strategy<Value = ConfigDocument> {
    prop::collection::vec(context_strategy(), 0..6).prop_map(|contexts| {
        let mut doc = ConfigDocument::default();
        let engine = MigrationEngine::default();
        for ctx in &contexts {
            engine.upsert_context(&mut doc, ctx, true);
            if let Some(server) = server_from_context(ctx) {
                engine.upsert_server(&mut doc, &server, false);
            }
        }
        doc
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Decoding an encoded document yields the same document
    #[test]
    fn codec_preserves_documents(doc in document_strategy()) {
        let yaml = DocumentLoader::encode(&doc).unwrap();
        let decoded = DocumentLoader::decode(&yaml).unwrap();
        prop_assert_eq!(&decoded, &doc);

        // and re-encoding is byte-for-byte stable
        prop_assert_eq!(DocumentLoader::encode(&decoded).unwrap(), yaml);
    }

    // An incoming entry with no optional sections leaves the stored one intact
    #[test]
    fn merge_with_bare_entry_is_identity(ctx in context_strategy()) {
        let mut merged = ctx.clone();
        let bare = Context::new(ctx.name.clone(), ctx.target.clone());
        ConfigMerger::merge_context(&mut merged, &bare, &PatchStrategies::new());
        prop_assert_eq!(merged, ctx);
    }

    // Merging an entry into itself changes nothing
    #[test]
    fn merge_is_idempotent(ctx in context_strategy()) {
        let mut merged = ctx.clone();
        ConfigMerger::merge_context(&mut merged, &ctx, &PatchStrategies::new());
        prop_assert_eq!(merged, ctx);
    }

    // With replace strategies the stored sections are fully overwritten
    #[test]
    fn replace_takes_incoming_sections(
        stored in context_strategy(),
        incoming in context_strategy(),
    ) {
        let mut strategies = PatchStrategies::new();
        for field in ["globalOpts", "clusterOpts", "additionalMetadata"] {
            strategies.insert(format!("contexts.{field}"), PatchStrategy::Replace);
        }

        let mut merged = stored;
        ConfigMerger::merge_context(&mut merged, &incoming, &strategies);

        prop_assert_eq!(merged.target, incoming.target);
        prop_assert_eq!(merged.global_opts, incoming.global_opts);
        prop_assert_eq!(merged.cluster_opts, incoming.cluster_opts);
        prop_assert_eq!(merged.additional_metadata, incoming.additional_metadata);
    }

    // A context and its derived server are always the same entity
    #[test]
    fn derived_server_is_same_entity(ctx in context_strategy()) {
        match server_from_context(&ctx) {
            Some(server) => prop_assert!(is_same_entity(&server, &ctx)),
            None => prop_assert_eq!(ctx.target, ContextKind::Tanzu),
        }
    }

    // Servers of another name never unify
    #[test]
    fn different_names_never_unify(a in name_strategy(), b in name_strategy()) {
        prop_assume!(a != b);
        let server = Server::new(a, ServerKind::ManagementCluster);
        let ctx = Context::new(b, ContextKind::Kubernetes);
        prop_assert!(!is_same_entity(&server, &ctx));
    }
}
