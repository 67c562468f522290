use crate::logic::classes::ClassResolution;
use crate::logic::error::ResolveError;
use crate::logic::parameters::ParameterResolution;
use crate::logic::traverse::Traversal;
use crate::model::{
    ClassView, EntityKind, EntityLinks, EntitySummary, GroupRef, GroupView, Id, NodeRef, NodeView,
    SourceRef,
};
use crate::store::traits::Store;

/// Resolution facade: composes traversal, class and parameter resolution
/// into the views the API layer serves.
///
/// Built per request with a snapshot-consistent store and the caller's
/// link builder; holds no state across requests.
pub struct Resolver<'a, S> {
    store: &'a S,
    links: &'a dyn EntityLinks,
}

impl<'a, S: Store> Resolver<'a, S> {
    pub fn new(store: &'a S, links: &'a dyn EntityLinks) -> Self {
        Self { store, links }
    }

    /// Full view of a node: its direct memberships expanded with their
    /// ancestor closures, every class that applies through that group set,
    /// and its effective parameters.
    pub async fn resolve_node(&self, name: &str) -> Result<NodeView, ResolveError> {
        let node = self
            .store
            .get_node_by_name(name)
            .await?
            .ok_or_else(|| ResolveError::not_found(EntityKind::Node, name))?;

        let node_source = SourceRef::new(EntityKind::Node, &node.name, self.links);
        let mut node_groups = Vec::new();
        for group in self.store.groups_of_node(node.id).await? {
            node_groups.push(GroupRef {
                id: group.id,
                name: group.name.clone(),
                href: self.links.href_for(EntityKind::NodeGroup, &group.name),
                source: node_source.clone(),
            });
            node_groups.extend(Traversal::ancestors(self.store, self.links, &group, true).await?);
        }

        let mut node_classes = ClassResolution::of_node(self.store, self.links, &node).await?;
        for group in &node_groups {
            node_classes.extend(
                ClassResolution::of_group(self.store, self.links, group.id, &group.name).await?,
            );
        }

        let parameters = ParameterResolution::for_node(self.store, self.links, &node).await?;

        Ok(NodeView {
            id: node.id,
            name: node.name,
            status: node.status,
            node_groups,
            node_classes,
            parameters,
        })
    }

    /// Full view of a group: both closures, every node in its subtree, its
    /// inherited class set, and its effective parameters.
    pub async fn resolve_group(&self, name: &str) -> Result<GroupView, ResolveError> {
        let group = self
            .store
            .get_group_by_name(name)
            .await?
            .ok_or_else(|| ResolveError::not_found(EntityKind::NodeGroup, name))?;

        let ancestors = Traversal::ancestors(self.store, self.links, &group, true).await?;
        let descendants = Traversal::descendants(self.store, self.links, &group).await?;

        let mut nodes = self.member_refs(group.id, &group.name).await?;
        for descendant in &descendants {
            nodes.extend(self.member_refs(descendant.id, &descendant.name).await?);
        }

        let mut node_classes =
            ClassResolution::of_group(self.store, self.links, group.id, &group.name).await?;
        for ancestor in &ancestors {
            node_classes.extend(
                ClassResolution::of_group(self.store, self.links, ancestor.id, &ancestor.name)
                    .await?,
            );
        }

        let parameters = ParameterResolution::for_group(self.store, self.links, &group).await?;

        Ok(GroupView {
            id: group.id,
            name: group.name,
            ancestors,
            descendants,
            nodes,
            node_classes,
            parameters,
        })
    }

    /// Full view of a class: the groups it effectively applies to (direct
    /// assignments plus their descendants) and every node it reaches,
    /// directly or through those groups.
    pub async fn resolve_class(&self, name: &str) -> Result<ClassView, ResolveError> {
        let class = self
            .store
            .get_class_by_name(name)
            .await?
            .ok_or_else(|| ResolveError::not_found(EntityKind::NodeClass, name))?;

        let node_groups =
            ClassResolution::groups_for_class(self.store, self.links, &class).await?;

        let class_source = SourceRef::new(EntityKind::NodeClass, &class.name, self.links);
        let mut nodes: Vec<NodeRef> = self
            .store
            .nodes_with_class(class.id)
            .await?
            .into_iter()
            .map(|node| NodeRef {
                id: node.id,
                href: self.links.href_for(EntityKind::Node, &node.name),
                name: node.name,
                source: class_source.clone(),
            })
            .collect();
        for group in &node_groups {
            nodes.extend(self.member_refs(group.id, &group.name).await?);
        }

        Ok(ClassView {
            id: class.id,
            name: class.name,
            node_groups,
            nodes,
        })
    }

    /// Plain enumeration; no resolution involved.
    pub async fn list_nodes(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<EntitySummary>, ResolveError> {
        Ok(self
            .store
            .list_nodes(status)
            .await?
            .into_iter()
            .map(|node| EntitySummary {
                id: node.id,
                href: self.links.href_for(EntityKind::Node, &node.name),
                name: node.name,
                status: node.status,
            })
            .collect())
    }

    pub async fn list_groups(&self) -> Result<Vec<EntitySummary>, ResolveError> {
        Ok(self
            .store
            .list_groups()
            .await?
            .into_iter()
            .map(|group| EntitySummary {
                id: group.id,
                href: self.links.href_for(EntityKind::NodeGroup, &group.name),
                name: group.name,
                status: None,
            })
            .collect())
    }

    pub async fn list_classes(&self) -> Result<Vec<EntitySummary>, ResolveError> {
        Ok(self
            .store
            .list_classes()
            .await?
            .into_iter()
            .map(|class| EntitySummary {
                id: class.id,
                href: self.links.href_for(EntityKind::NodeClass, &class.name),
                name: class.name,
                status: None,
            })
            .collect())
    }

    /// Direct members of one group, sourced from that group.
    async fn member_refs(&self, group_id: Id, group_name: &str) -> Result<Vec<NodeRef>, ResolveError> {
        let source = SourceRef::new(EntityKind::NodeGroup, group_name, self.links);
        Ok(self
            .store
            .members_of_group(group_id)
            .await?
            .into_iter()
            .map(|node| NodeRef {
                id: node.id,
                href: self.links.href_for(EntityKind::Node, &node.name),
                name: node.name,
                source: source.clone(),
            })
            .collect())
    }
}
