use anyhow::Result;
use chrono::Utc;
use itertools::Itertools;
use parking_lot::RwLock;

use crate::model::{Id, Node, NodeClass, NodeGroup, ParamOwner, Parameter};
use crate::store::traits::{ClassStore, GroupStore, NodeStore, ParameterStore, Store};

/// In-memory store used by tests and demos.
///
/// Row order in the vectors is the declaration order the resolution engine
/// depends on (edge precedence, membership order), so mutations only ever
/// append or remove, never reorder.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: Id,
    nodes: Vec<Node>,
    groups: Vec<NodeGroup>,
    classes: Vec<NodeClass>,
    /// (child_id, parent_id) in declaration order.
    edges: Vec<(Id, Id)>,
    /// (node_id, group_id)
    group_memberships: Vec<(Id, Id)>,
    /// (node_id, class_id)
    node_class_memberships: Vec<(Id, Id)>,
    /// (group_id, class_id)
    group_class_memberships: Vec<(Id, Id)>,
    /// (owner, owner_id, key, value)
    parameters: Vec<(ParamOwner, Id, String, String)>,
}

impl Inner {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }

    fn group(&self, id: Id) -> Option<NodeGroup> {
        self.groups.iter().find(|g| g.id == id).cloned()
    }

    fn node(&self, id: Id) -> Option<Node> {
        self.nodes.iter().find(|n| n.id == id).cloned()
    }

    fn class(&self, id: Id) -> Option<NodeClass> {
        self.classes.iter().find(|c| c.id == id).cloned()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a node's status; statuses normally come from the reporting
    /// pipeline, which has no other stand-in here.
    pub fn set_node_status(&self, node_id: Id, status: &str) {
        let mut inner = self.inner.write();
        if let Some(node) = inner.nodes.iter_mut().find(|n| n.id == node_id) {
            node.status = Some(status.to_string());
        }
    }
}

#[async_trait::async_trait]
impl NodeStore for MemoryStore {
    async fn get_node(&self, id: Id) -> Result<Option<Node>> {
        Ok(self.inner.read().node(id))
    }

    async fn get_node_by_name(&self, name: &str) -> Result<Option<Node>> {
        Ok(self.inner.read().nodes.iter().find(|n| n.name == name).cloned())
    }

    async fn list_nodes(&self, status: Option<&str>) -> Result<Vec<Node>> {
        let inner = self.inner.read();
        Ok(inner
            .nodes
            .iter()
            .filter(|n| match status {
                Some(status) => n.status.as_deref() == Some(status),
                None => true,
            })
            .cloned()
            .sorted_by_key(|n| n.name.to_uppercase())
            .collect())
    }

    async fn create_node(&self, name: &str) -> Result<Node> {
        let mut inner = self.inner.write();
        let node = Node {
            id: inner.next_id(),
            name: name.to_string(),
            status: None,
            created_at: Utc::now(),
        };
        inner.nodes.push(node.clone());
        Ok(node)
    }

    async fn delete_node(&self, id: Id) -> Result<bool> {
        let mut inner = self.inner.write();
        let existed = inner.nodes.iter().any(|n| n.id == id);
        inner.nodes.retain(|n| n.id != id);
        inner.group_memberships.retain(|(node_id, _)| *node_id != id);
        inner.node_class_memberships.retain(|(node_id, _)| *node_id != id);
        inner
            .parameters
            .retain(|(owner, owner_id, _, _)| !(*owner == ParamOwner::Node && *owner_id == id));
        Ok(existed)
    }

    async fn groups_of_node(&self, node_id: Id) -> Result<Vec<NodeGroup>> {
        let inner = self.inner.read();
        Ok(inner
            .group_memberships
            .iter()
            .filter(|(n, _)| *n == node_id)
            .filter_map(|(_, g)| inner.group(*g))
            .collect())
    }

    async fn classes_of_node(&self, node_id: Id) -> Result<Vec<NodeClass>> {
        let inner = self.inner.read();
        Ok(inner
            .node_class_memberships
            .iter()
            .filter(|(n, _)| *n == node_id)
            .filter_map(|(_, c)| inner.class(*c))
            .collect())
    }

    async fn add_node_to_group(&self, node_id: Id, group_id: Id) -> Result<()> {
        self.inner.write().group_memberships.push((node_id, group_id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl GroupStore for MemoryStore {
    async fn get_group(&self, id: Id) -> Result<Option<NodeGroup>> {
        Ok(self.inner.read().group(id))
    }

    async fn get_group_by_name(&self, name: &str) -> Result<Option<NodeGroup>> {
        Ok(self.inner.read().groups.iter().find(|g| g.name == name).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<NodeGroup>> {
        Ok(self
            .inner
            .read()
            .groups
            .iter()
            .cloned()
            .sorted_by_key(|g| g.name.to_uppercase())
            .collect())
    }

    async fn create_group(&self, name: &str) -> Result<NodeGroup> {
        let mut inner = self.inner.write();
        let group = NodeGroup {
            id: inner.next_id(),
            name: name.to_string(),
        };
        inner.groups.push(group.clone());
        Ok(group)
    }

    async fn add_group_edge(&self, child_id: Id, parent_id: Id) -> Result<()> {
        self.inner.write().edges.push((child_id, parent_id));
        Ok(())
    }

    async fn parents_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>> {
        let inner = self.inner.read();
        Ok(inner
            .edges
            .iter()
            .filter(|(child, _)| *child == group_id)
            .filter_map(|(_, parent)| inner.group(*parent))
            .collect())
    }

    async fn children_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>> {
        let inner = self.inner.read();
        Ok(inner
            .edges
            .iter()
            .filter(|(_, parent)| *parent == group_id)
            .filter_map(|(child, _)| inner.group(*child))
            .collect())
    }

    async fn members_of_group(&self, group_id: Id) -> Result<Vec<Node>> {
        let inner = self.inner.read();
        Ok(inner
            .group_memberships
            .iter()
            .filter(|(_, g)| *g == group_id)
            .filter_map(|(n, _)| inner.node(*n))
            .collect())
    }

    async fn classes_of_group(&self, group_id: Id) -> Result<Vec<NodeClass>> {
        let inner = self.inner.read();
        Ok(inner
            .group_class_memberships
            .iter()
            .filter(|(g, _)| *g == group_id)
            .filter_map(|(_, c)| inner.class(*c))
            .collect())
    }

    async fn assign_class_to_group(&self, group_id: Id, class_id: Id) -> Result<()> {
        self.inner.write().group_class_memberships.push((group_id, class_id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClassStore for MemoryStore {
    async fn get_class(&self, id: Id) -> Result<Option<NodeClass>> {
        Ok(self.inner.read().class(id))
    }

    async fn get_class_by_name(&self, name: &str) -> Result<Option<NodeClass>> {
        Ok(self.inner.read().classes.iter().find(|c| c.name == name).cloned())
    }

    async fn list_classes(&self) -> Result<Vec<NodeClass>> {
        Ok(self
            .inner
            .read()
            .classes
            .iter()
            .cloned()
            .sorted_by_key(|c| c.name.to_uppercase())
            .collect())
    }

    async fn create_class(&self, name: &str) -> Result<NodeClass> {
        let mut inner = self.inner.write();
        let class = NodeClass {
            id: inner.next_id(),
            name: name.to_string(),
        };
        inner.classes.push(class.clone());
        Ok(class)
    }

    async fn groups_with_class(&self, class_id: Id) -> Result<Vec<NodeGroup>> {
        let inner = self.inner.read();
        Ok(inner
            .group_class_memberships
            .iter()
            .filter(|(_, c)| *c == class_id)
            .filter_map(|(g, _)| inner.group(*g))
            .collect())
    }

    async fn nodes_with_class(&self, class_id: Id) -> Result<Vec<Node>> {
        let inner = self.inner.read();
        Ok(inner
            .node_class_memberships
            .iter()
            .filter(|(_, c)| *c == class_id)
            .filter_map(|(n, _)| inner.node(*n))
            .collect())
    }

    async fn assign_class_to_node(&self, node_id: Id, class_id: Id) -> Result<()> {
        self.inner.write().node_class_memberships.push((node_id, class_id));
        Ok(())
    }
}

#[async_trait::async_trait]
impl ParameterStore for MemoryStore {
    async fn parameters_of(&self, owner: ParamOwner, owner_id: Id) -> Result<Vec<Parameter>> {
        let inner = self.inner.read();
        Ok(inner
            .parameters
            .iter()
            .filter(|(o, oid, _, _)| *o == owner && *oid == owner_id)
            .map(|(_, _, key, value)| Parameter {
                key: key.clone(),
                value: value.clone(),
            })
            .sorted_by_key(|p| p.key.to_uppercase())
            .collect())
    }

    async fn set_parameter(
        &self,
        owner: ParamOwner,
        owner_id: Id,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let mut inner = self.inner.write();
        if let Some(row) = inner
            .parameters
            .iter_mut()
            .find(|(o, oid, k, _)| *o == owner && *oid == owner_id && k == key)
        {
            row.3 = value.to_string();
        } else {
            inner
                .parameters
                .push((owner, owner_id, key.to_string(), value.to_string()));
        }
        Ok(())
    }
}

impl Store for MemoryStore {}
