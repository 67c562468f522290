use crate::model::EntityKind;
use serde::{Deserialize, Serialize};

/// Which kind of entity a parameter row is scoped to.
///
/// Mirrors the storage layer's polymorphic `parameterable_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamOwner {
    Node,
    NodeGroup,
}

impl ParamOwner {
    /// Discriminator value used in the `parameters` table.
    pub fn db_type(&self) -> &'static str {
        match self {
            ParamOwner::Node => "Node",
            ParamOwner::NodeGroup => "NodeGroup",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            ParamOwner::Node => EntityKind::Node,
            ParamOwner::NodeGroup => EntityKind::NodeGroup,
        }
    }
}

/// A directly-assigned key/value setting on one owner.
///
/// Values are opaque payloads; the engine performs no coercion or
/// validation of their contents. Keys are unique per owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: String,
    pub value: String,
}
