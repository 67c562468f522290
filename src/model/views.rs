use crate::model::{Id, SourceRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A group surfaced inside a resolved view, annotated with the entity it
/// was reached from at that step of the traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: Id,
    pub name: String,
    pub href: String,
    pub source: SourceRef,
}

/// A class surfaced inside a resolved view, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRef {
    pub id: Id,
    pub name: String,
    pub href: String,
    pub source: SourceRef,
}

/// A node surfaced inside a resolved view, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: Id,
    pub name: String,
    pub href: String,
    pub source: SourceRef,
}

/// An effective parameter value after override resolution, annotated with
/// the owner whose assignment won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParameter {
    pub key: String,
    pub value: String,
    pub source: SourceRef,
}

/// Effective parameter mapping, keyed by parameter name.
pub type ResolvedParameters = BTreeMap<String, ResolvedParameter>;

/// Fully resolved view of a node: its group closure, effective classes,
/// and effective parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Direct memberships, each followed by its full ancestor closure.
    pub node_groups: Vec<GroupRef>,
    /// Directly-assigned classes plus classes of every group in
    /// `node_groups`. Duplicates with distinct provenance are preserved.
    pub node_classes: Vec<ClassRef>,
    pub parameters: ResolvedParameters,
}

/// Fully resolved view of a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupView {
    pub id: Id,
    pub name: String,
    pub ancestors: Vec<GroupRef>,
    pub descendants: Vec<GroupRef>,
    /// Direct members plus members of every descendant.
    pub nodes: Vec<NodeRef>,
    /// Own classes plus classes of every ancestor.
    pub node_classes: Vec<ClassRef>,
    pub parameters: ResolvedParameters,
}

/// Fully resolved view of a class: everything it effectively applies to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassView {
    pub id: Id,
    pub name: String,
    /// Groups with a direct assignment, each followed by its descendants.
    pub node_groups: Vec<GroupRef>,
    /// Direct assignees plus members of every group in `node_groups`.
    pub nodes: Vec<NodeRef>,
}

/// Listing entry for the enumeration endpoints; no resolution involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub id: Id,
    pub name: String,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
