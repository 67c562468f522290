use crate::logic::error::ResolveError;
use crate::logic::traverse::Traversal;
use crate::model::{ClassRef, EntityKind, EntityLinks, GroupRef, Id, Node, NodeClass, SourceRef};
use crate::store::traits::Store;

/// Class queries with provenance.
///
/// Classes propagate downward: an assignment on a group applies to the
/// whole subtree rooted there. The downward composition itself (walking
/// ancestors of memberships, descendants of assignments) happens at the
/// facade; these queries answer the direct-assignment questions it
/// composes from.
pub struct ClassResolution;

impl ClassResolution {
    /// Classes directly assigned to a node, sourced from the node.
    pub async fn of_node<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        node: &Node,
    ) -> Result<Vec<ClassRef>, ResolveError> {
        let source = SourceRef::new(EntityKind::Node, &node.name, links);
        let classes = store.classes_of_node(node.id).await?;
        Ok(class_refs(classes, &source, links))
    }

    /// Classes directly assigned to a group, sourced from the group.
    pub async fn of_group<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        group_id: Id,
        group_name: &str,
    ) -> Result<Vec<ClassRef>, ResolveError> {
        let source = SourceRef::new(EntityKind::NodeGroup, group_name, links);
        let classes = store.classes_of_group(group_id).await?;
        Ok(class_refs(classes, &source, links))
    }

    /// Groups a class effectively applies to: every group with a direct
    /// assignment, each followed by its full descendant closure (the
    /// inverse of downward propagation).
    pub async fn groups_for_class<S: Store>(
        store: &S,
        links: &dyn EntityLinks,
        class: &NodeClass,
    ) -> Result<Vec<GroupRef>, ResolveError> {
        let source = SourceRef::new(EntityKind::NodeClass, &class.name, links);
        let mut out = Vec::new();
        for group in store.groups_with_class(class.id).await? {
            out.push(GroupRef {
                id: group.id,
                name: group.name.clone(),
                href: links.href_for(EntityKind::NodeGroup, &group.name),
                source: source.clone(),
            });
            out.extend(Traversal::descendants(store, links, &group).await?);
        }
        Ok(out)
    }
}

fn class_refs(
    classes: Vec<NodeClass>,
    source: &SourceRef,
    links: &dyn EntityLinks,
) -> Vec<ClassRef> {
    classes
        .into_iter()
        .map(|class| ClassRef {
            id: class.id,
            name: class.name.clone(),
            href: links.href_for(EntityKind::NodeClass, &class.name),
            source: source.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoLinks;
    use crate::store::memory::MemoryStore;
    use crate::store::traits::{ClassStore, GroupStore, NodeStore};

    #[tokio::test]
    async fn direct_node_classes_carry_node_provenance() {
        let store = MemoryStore::new();
        let node = store.create_node("web01").await.unwrap();
        let ntp = store.create_class("ntp").await.unwrap();
        store.assign_class_to_node(node.id, ntp.id).await.unwrap();

        let classes = ClassResolution::of_node(&store, &NoLinks, &node).await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "ntp");
        assert_eq!(classes[0].source.kind, EntityKind::Node);
        assert_eq!(classes[0].source.name, "web01");
    }

    #[tokio::test]
    async fn groups_for_class_include_descendants() {
        let store = MemoryStore::new();
        let base = store.create_group("base").await.unwrap();
        let web = store.create_group("webservers").await.unwrap();
        store.add_group_edge(web.id, base.id).await.unwrap();
        let monitoring = store.create_class("monitoring").await.unwrap();
        store
            .assign_class_to_group(base.id, monitoring.id)
            .await
            .unwrap();

        let groups = ClassResolution::groups_for_class(&store, &NoLinks, &monitoring)
            .await
            .unwrap();
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["base", "webservers"]);
        assert_eq!(groups[0].source.kind, EntityKind::NodeClass);
        assert_eq!(groups[1].source.name, "base");
    }
}
