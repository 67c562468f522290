use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A node group: one vertex of the inheritance DAG.
///
/// Groups own directly-assigned classes and parameters and may declare any
/// number of parent groups (multiple inheritance). The child→parent edge
/// relation, transitively closed, must stay acyclic; traversal treats a
/// cycle as a data-integrity failure rather than recursing forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub id: Id,
    pub name: String,
}
