use crate::model::EntityKind;
use thiserror::Error;

/// Failure modes of the resolution engine.
///
/// Nothing here is retried inside the engine; traversal and merge are
/// deterministic over one snapshot, so a retry cannot change the outcome.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The requested entity does not exist. Recovered at the facade
    /// boundary and mapped to the presentation layer's own absence.
    #[error("{} '{name}' not found", .kind.path_segment())]
    NotFound { kind: EntityKind, name: String },

    /// Traversal revisited a group already on the current path. The edge
    /// set is supposed to be a DAG; this fails the request instead of
    /// recursing unboundedly.
    #[error("inheritance cycle detected at group '{group}'")]
    Cycle { group: String },

    /// The entity store failed; the caller decides whether to retry.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl ResolveError {
    pub fn not_found(kind: EntityKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
