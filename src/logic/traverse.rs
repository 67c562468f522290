use std::future::Future;
use std::pin::Pin;

use crate::logic::error::ResolveError;
use crate::model::{EntityKind, EntityLinks, GroupRef, Id, NodeGroup, SourceRef};
use crate::store::traits::Store;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ResolveError>> + Send + 'a>>;

/// Transitive closure walks over the group inheritance DAG.
///
/// Output order is depth-first pre-order: each parent (or child) in its
/// declared edge order, immediately followed by its own closure. Every
/// entry carries the group it was reached from at that step as its source.
/// Groups reachable along more than one path appear once per path; the
/// engine does not deduplicate.
pub struct Traversal;

impl Traversal {
    /// Immediate parents of `group`, expanded to the full ancestor closure
    /// when `recurse` is set.
    pub async fn ancestors<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        group: &NodeGroup,
        recurse: bool,
    ) -> Result<Vec<GroupRef>, ResolveError> {
        let mut out = Vec::new();
        let mut path = vec![group.id];
        walk(store, links, group, Direction::Up, recurse, &mut path, &mut out).await?;
        Ok(out)
    }

    /// Full descendant closure of `group`; always recursive.
    pub async fn descendants<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        group: &NodeGroup,
    ) -> Result<Vec<GroupRef>, ResolveError> {
        let mut out = Vec::new();
        let mut path = vec![group.id];
        walk(store, links, group, Direction::Down, true, &mut path, &mut out).await?;
        Ok(out)
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

fn walk<'a, S: Store>(
    store: &'a S,
    links: &'a dyn EntityLinks,
    group: &'a NodeGroup,
    direction: Direction,
    recurse: bool,
    path: &'a mut Vec<Id>,
    out: &'a mut Vec<GroupRef>,
) -> WalkFuture<'a> {
    Box::pin(async move {
        let next = match direction {
            Direction::Up => store.parents_of_group(group.id).await?,
            Direction::Down => store.children_of_group(group.id).await?,
        };
        for reached in next {
            out.push(GroupRef {
                id: reached.id,
                name: reached.name.clone(),
                href: links.href_for(EntityKind::NodeGroup, &reached.name),
                source: SourceRef::new(EntityKind::NodeGroup, &group.name, links),
            });
            if recurse {
                // A group already expanded on this path means the edge set
                // is cyclic; fail the request instead of recursing forever.
                if path.contains(&reached.id) {
                    return Err(ResolveError::Cycle { group: reached.name });
                }
                path.push(reached.id);
                walk(store, links, &reached, direction, true, path, out).await?;
                path.pop();
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoLinks;
    use crate::store::memory::MemoryStore;
    use crate::store::traits::GroupStore;

    #[tokio::test]
    async fn ancestors_non_recursive_returns_immediate_parents_only() {
        let store = MemoryStore::new();
        let base = store.create_group("base").await.unwrap();
        let mid = store.create_group("mid").await.unwrap();
        let leaf = store.create_group("leaf").await.unwrap();
        store.add_group_edge(mid.id, base.id).await.unwrap();
        store.add_group_edge(leaf.id, mid.id).await.unwrap();

        let parents = Traversal::ancestors(&store, &NoLinks, &leaf, false)
            .await
            .unwrap();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].name, "mid");
    }

    #[tokio::test]
    async fn ancestors_recursive_is_preorder_with_per_step_provenance() {
        let store = MemoryStore::new();
        let base = store.create_group("base").await.unwrap();
        let mid = store.create_group("mid").await.unwrap();
        let leaf = store.create_group("leaf").await.unwrap();
        store.add_group_edge(mid.id, base.id).await.unwrap();
        store.add_group_edge(leaf.id, mid.id).await.unwrap();

        let ancestors = Traversal::ancestors(&store, &NoLinks, &leaf, true)
            .await
            .unwrap();
        let names: Vec<_> = ancestors.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["mid", "base"]);
        // base was reached from mid, not from the starting group
        assert_eq!(ancestors[1].source.name, "mid");
    }

    #[tokio::test]
    async fn converging_paths_produce_duplicate_entries() {
        let store = MemoryStore::new();
        let top = store.create_group("top").await.unwrap();
        let left = store.create_group("left").await.unwrap();
        let right = store.create_group("right").await.unwrap();
        let bottom = store.create_group("bottom").await.unwrap();
        store.add_group_edge(left.id, top.id).await.unwrap();
        store.add_group_edge(right.id, top.id).await.unwrap();
        store.add_group_edge(bottom.id, left.id).await.unwrap();
        store.add_group_edge(bottom.id, right.id).await.unwrap();

        let ancestors = Traversal::ancestors(&store, &NoLinks, &bottom, true)
            .await
            .unwrap();
        let names: Vec<_> = ancestors.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["left", "top", "right", "top"]);
    }

    #[tokio::test]
    async fn cyclic_edges_fail_with_cycle_error() {
        let store = MemoryStore::new();
        let a = store.create_group("a").await.unwrap();
        let b = store.create_group("b").await.unwrap();
        store.add_group_edge(a.id, b.id).await.unwrap();
        store.add_group_edge(b.id, a.id).await.unwrap();

        let err = Traversal::ancestors(&store, &NoLinks, &a, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Cycle { .. }));
    }

    #[tokio::test]
    async fn descendants_inverse_of_ancestors() {
        let store = MemoryStore::new();
        let base = store.create_group("base").await.unwrap();
        let web = store.create_group("webservers").await.unwrap();
        store.add_group_edge(web.id, base.id).await.unwrap();

        let descendants = Traversal::descendants(&store, &NoLinks, &base).await.unwrap();
        assert!(descendants.iter().any(|g| g.id == web.id));
        let ancestors = Traversal::ancestors(&store, &NoLinks, &web, true)
            .await
            .unwrap();
        assert!(ancestors.iter().any(|g| g.id == base.id));
    }
}
