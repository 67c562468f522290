use crate::model::Id;
use serde::{Deserialize, Serialize};

/// A named role assignable to nodes or groups.
///
/// A class assigned to a group is inherited by every descendant group and
/// by the members of all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeClass {
    pub id: Id,
    pub name: String,
}
