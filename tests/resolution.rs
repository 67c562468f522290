use axum::extract::{Host, Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use node_classifier::api::handlers::{self, ApiContext};
use node_classifier::logic::{ResolveError, Resolver};
use node_classifier::model::{EntityKind, NoLinks, ParamOwner};
use node_classifier::store::{ClassStore, GroupStore, MemoryStore, NodeStore, ParameterStore};

/// Builds the scenario the classifier was designed around: node `web01`
/// is a member of `webservers`, whose parent is `base`.
async fn web_fixture(store: &MemoryStore) {
    let base = store.create_group("base").await.unwrap();
    let web = store.create_group("webservers").await.unwrap();
    store.add_group_edge(web.id, base.id).await.unwrap();

    let node = store.create_node("web01").await.unwrap();
    store.add_node_to_group(node.id, web.id).await.unwrap();

    store
        .set_parameter(ParamOwner::NodeGroup, base.id, "env", "prod")
        .await
        .unwrap();
    store
        .set_parameter(ParamOwner::NodeGroup, web.id, "env", "staging")
        .await
        .unwrap();

    let monitoring = store.create_class("monitoring").await.unwrap();
    store
        .assign_class_to_group(base.id, monitoring.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn node_parameter_comes_from_closest_group() {
    let store = MemoryStore::new();
    web_fixture(&store).await;

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_node("web01").await.unwrap();

    assert_eq!(view.parameters["env"].value, "staging");
    assert_eq!(view.parameters["env"].source.name, "webservers");
}

#[tokio::test]
async fn node_inherits_class_assigned_to_ancestor_group() {
    let store = MemoryStore::new();
    web_fixture(&store).await;

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_node("web01").await.unwrap();

    let monitoring = view
        .node_classes
        .iter()
        .find(|c| c.name == "monitoring")
        .expect("monitoring class should be inherited");
    assert_eq!(monitoring.source.kind, EntityKind::NodeGroup);
    assert_eq!(monitoring.source.name, "base");
}

#[tokio::test]
async fn node_groups_contain_direct_membership_and_ancestors() {
    let store = MemoryStore::new();
    web_fixture(&store).await;

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_node("web01").await.unwrap();

    let names: Vec<_> = view.node_groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["webservers", "base"]);
    // direct membership is sourced from the node, the ancestor from the
    // group it was reached through
    assert_eq!(view.node_groups[0].source.kind, EntityKind::Node);
    assert_eq!(view.node_groups[1].source.name, "webservers");
}

#[tokio::test]
async fn node_own_parameter_beats_group_parameter() {
    let store = MemoryStore::new();
    web_fixture(&store).await;
    let node = store.get_node_by_name("web01").await.unwrap().unwrap();
    store
        .set_parameter(ParamOwner::Node, node.id, "env", "override")
        .await
        .unwrap();

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_node("web01").await.unwrap();

    assert_eq!(view.parameters["env"].value, "override");
    assert_eq!(view.parameters["env"].source.kind, EntityKind::Node);
}

#[tokio::test]
async fn group_view_composes_both_closures() {
    let store = MemoryStore::new();
    web_fixture(&store).await;

    let resolver = Resolver::new(&store, &NoLinks);
    let base = resolver.resolve_group("base").await.unwrap();
    let web = resolver.resolve_group("webservers").await.unwrap();

    // inverse property: webservers descends from base, base is an
    // ancestor of webservers
    assert!(base.descendants.iter().any(|g| g.name == "webservers"));
    assert!(web.ancestors.iter().any(|g| g.name == "base"));

    // base sees the member of its descendant; webservers inherits base's
    // class and overrides its parameter
    assert!(base.nodes.iter().any(|n| n.name == "web01"));
    assert!(web.node_classes.iter().any(|c| c.name == "monitoring"));
    assert_eq!(web.parameters["env"].value, "staging");
    assert_eq!(base.parameters["env"].value, "prod");
}

#[tokio::test]
async fn sibling_parents_merge_first_declared_wins() {
    let store = MemoryStore::new();
    let p1 = store.create_group("pool-a").await.unwrap();
    let p2 = store.create_group("pool-b").await.unwrap();
    let child = store.create_group("leaf").await.unwrap();
    store.add_group_edge(child.id, p1.id).await.unwrap();
    store.add_group_edge(child.id, p2.id).await.unwrap();
    store
        .set_parameter(ParamOwner::NodeGroup, p1.id, "dns", "10.0.0.1")
        .await
        .unwrap();
    store
        .set_parameter(ParamOwner::NodeGroup, p2.id, "dns", "10.0.0.2")
        .await
        .unwrap();

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_group("leaf").await.unwrap();
    assert_eq!(view.parameters["dns"].value, "10.0.0.1");
    assert_eq!(view.parameters["dns"].source.name, "pool-a");
}

#[tokio::test]
async fn class_view_expands_through_descendants() {
    let store = MemoryStore::new();
    web_fixture(&store).await;

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_class("monitoring").await.unwrap();

    let group_names: Vec<_> = view.node_groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(group_names, vec!["base", "webservers"]);
    // web01 is reached through the webservers descendant
    let web01 = view.nodes.iter().find(|n| n.name == "web01").unwrap();
    assert_eq!(web01.source.name, "webservers");
}

#[tokio::test]
async fn duplicate_provenance_entries_are_preserved() {
    let store = MemoryStore::new();
    let shared = store.create_group("shared").await.unwrap();
    let g1 = store.create_group("g1").await.unwrap();
    let g2 = store.create_group("g2").await.unwrap();
    store.add_group_edge(g1.id, shared.id).await.unwrap();
    store.add_group_edge(g2.id, shared.id).await.unwrap();

    let node = store.create_node("dual").await.unwrap();
    store.add_node_to_group(node.id, g1.id).await.unwrap();
    store.add_node_to_group(node.id, g2.id).await.unwrap();

    let common = store.create_class("common").await.unwrap();
    store
        .assign_class_to_group(shared.id, common.id)
        .await
        .unwrap();

    let resolver = Resolver::new(&store, &NoLinks);
    let view = resolver.resolve_node("dual").await.unwrap();

    // shared is reachable through both memberships and appears per path
    let shared_entries: Vec<_> = view
        .node_groups
        .iter()
        .filter(|g| g.name == "shared")
        .collect();
    assert_eq!(shared_entries.len(), 2);
    assert_eq!(shared_entries[0].source.name, "g1");
    assert_eq!(shared_entries[1].source.name, "g2");

    // and its class shows up once per occurrence
    let common_entries = view
        .node_classes
        .iter()
        .filter(|c| c.name == "common")
        .count();
    assert_eq!(common_entries, 2);
}

#[tokio::test]
async fn cyclic_edges_yield_typed_error_not_hang() {
    let store = MemoryStore::new();
    let a = store.create_group("a").await.unwrap();
    let b = store.create_group("b").await.unwrap();
    store.add_group_edge(a.id, b.id).await.unwrap();
    store.add_group_edge(b.id, a.id).await.unwrap();

    let resolver = Resolver::new(&store, &NoLinks);
    let err = resolver.resolve_group("a").await.unwrap_err();
    assert!(matches!(err, ResolveError::Cycle { .. }));
}

#[tokio::test]
async fn missing_entities_resolve_to_not_found() {
    let store = MemoryStore::new();
    let resolver = Resolver::new(&store, &NoLinks);

    assert!(resolver.resolve_node("ghost").await.unwrap_err().is_not_found());
    assert!(resolver.resolve_group("ghost").await.unwrap_err().is_not_found());
    assert!(resolver.resolve_class("ghost").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn listings_sort_case_insensitively_and_filter_by_status() {
    let store = MemoryStore::new();
    let zulu = store.create_node("Zulu").await.unwrap();
    let alpha = store.create_node("alpha").await.unwrap();
    let mike = store.create_node("Mike").await.unwrap();
    store.set_node_status(alpha.id, "unreported");
    store.set_node_status(zulu.id, "failed");
    store.set_node_status(mike.id, "failed");

    let resolver = Resolver::new(&store, &NoLinks);
    let all = resolver.list_nodes(None).await.unwrap();
    let names: Vec<_> = all.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "Mike", "Zulu"]);

    let failed = resolver.list_nodes(Some("failed")).await.unwrap();
    let names: Vec<_> = failed.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Mike", "Zulu"]);
}

fn test_context(store: MemoryStore) -> ApiContext<MemoryStore> {
    ApiContext {
        store: Arc::new(store),
        protocol: "https".to_string(),
    }
}

#[tokio::test]
async fn get_node_handler_builds_hrefs_from_request_host() {
    let store = MemoryStore::new();
    web_fixture(&store).await;
    let ctx = test_context(store);

    let response = handlers::get_node(
        State(ctx),
        Host("classifier.example.com".to_string()),
        Path("web01".to_string()),
    )
    .await
    .unwrap();

    let view = response.0;
    assert_eq!(
        view.node_groups[0].href,
        "https://classifier.example.com/api/node_group/webservers"
    );
    assert_eq!(
        view.parameters["env"].source.href,
        "https://classifier.example.com/api/node_group/webservers"
    );
}

#[tokio::test]
async fn get_node_handler_maps_missing_node_to_404() {
    let ctx = test_context(MemoryStore::new());

    let err = handlers::get_node::<MemoryStore>(
        State(ctx),
        Host("localhost".to_string()),
        Path("ghost".to_string()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_node_handler_cascades_memberships() {
    let store = MemoryStore::new();
    web_fixture(&store).await;
    let ctx = test_context(store);

    let status = handlers::delete_node(State(ctx.clone()), Path("web01".to_string()))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(ctx.store.get_node_by_name("web01").await.unwrap().is_none());
    let web = ctx.store.get_group_by_name("webservers").await.unwrap().unwrap();
    assert!(ctx.store.members_of_group(web.id).await.unwrap().is_empty());

    // deleting again is a 404
    let err = handlers::delete_node(State(ctx), Path("web01".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}
