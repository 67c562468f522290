use crate::model::{Id, Node, NodeClass, NodeGroup, ParamOwner, Parameter};
use anyhow::Result;

/// Read contract for nodes plus the thin mutations the surrounding system
/// performs (creation, deletion, membership). The resolution engine only
/// ever reads.
#[async_trait::async_trait]
pub trait NodeStore: Send + Sync {
    async fn get_node(&self, id: Id) -> Result<Option<Node>>;
    async fn get_node_by_name(&self, name: &str) -> Result<Option<Node>>;
    /// All nodes, sorted case-insensitively by name, optionally filtered
    /// by status.
    async fn list_nodes(&self, status: Option<&str>) -> Result<Vec<Node>>;
    async fn create_node(&self, name: &str) -> Result<Node>;
    /// Deletes the node and cascades its membership rows. Returns false if
    /// the node did not exist.
    async fn delete_node(&self, id: Id) -> Result<bool>;
    /// Groups the node is a direct member of, in membership order.
    async fn groups_of_node(&self, node_id: Id) -> Result<Vec<NodeGroup>>;
    /// Classes directly assigned to the node.
    async fn classes_of_node(&self, node_id: Id) -> Result<Vec<NodeClass>>;
    async fn add_node_to_group(&self, node_id: Id, group_id: Id) -> Result<()>;
}

#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    async fn get_group(&self, id: Id) -> Result<Option<NodeGroup>>;
    async fn get_group_by_name(&self, name: &str) -> Result<Option<NodeGroup>>;
    async fn list_groups(&self) -> Result<Vec<NodeGroup>>;
    async fn create_group(&self, name: &str) -> Result<NodeGroup>;
    /// Declares `parent_id` as a parent of `child_id`. Edge order is the
    /// declaration order and is significant for parameter precedence.
    async fn add_group_edge(&self, child_id: Id, parent_id: Id) -> Result<()>;
    /// Immediate parents of the group, in edge declaration order.
    async fn parents_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>>;
    /// Immediate children of the group, in edge declaration order.
    async fn children_of_group(&self, group_id: Id) -> Result<Vec<NodeGroup>>;
    /// Nodes that are direct members of the group.
    async fn members_of_group(&self, group_id: Id) -> Result<Vec<Node>>;
    /// Classes directly assigned to the group.
    async fn classes_of_group(&self, group_id: Id) -> Result<Vec<NodeClass>>;
    async fn assign_class_to_group(&self, group_id: Id, class_id: Id) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ClassStore: Send + Sync {
    async fn get_class(&self, id: Id) -> Result<Option<NodeClass>>;
    async fn get_class_by_name(&self, name: &str) -> Result<Option<NodeClass>>;
    async fn list_classes(&self) -> Result<Vec<NodeClass>>;
    async fn create_class(&self, name: &str) -> Result<NodeClass>;
    /// Groups with a direct assignment of the class.
    async fn groups_with_class(&self, class_id: Id) -> Result<Vec<NodeGroup>>;
    /// Nodes with a direct assignment of the class.
    async fn nodes_with_class(&self, class_id: Id) -> Result<Vec<Node>>;
    async fn assign_class_to_node(&self, node_id: Id, class_id: Id) -> Result<()>;
}

#[async_trait::async_trait]
pub trait ParameterStore: Send + Sync {
    /// Directly-assigned parameters of one owner, ordered case-insensitively
    /// by key. Keys are unique within the result.
    async fn parameters_of(&self, owner: ParamOwner, owner_id: Id) -> Result<Vec<Parameter>>;
    /// Upserts a parameter; last write wins per `(owner, key)`.
    async fn set_parameter(
        &self,
        owner: ParamOwner,
        owner_id: Id,
        key: &str,
        value: &str,
    ) -> Result<()>;
}

pub trait Store: NodeStore + GroupStore + ClassStore + ParameterStore + Send + Sync {}
