use crate::model::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An infrastructure node (host) known to the classifier.
///
/// Nodes belong to zero or more groups via membership and may carry
/// directly-assigned classes and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    pub name: String,
    /// Reporting status as recorded by the storage layer (e.g. "unreported",
    /// "failed"). Opaque to the resolution engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
}
