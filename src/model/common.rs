use serde::{Deserialize, Serialize};

/// Entity identifiers are the storage layer's row ids.
pub type Id = i64;

/// The kind of entity a provenance record or link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Node,
    NodeGroup,
    NodeClass,
}

impl EntityKind {
    /// URL path segment used by the presentation layer for this kind.
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::NodeGroup => "node_group",
            EntityKind::NodeClass => "node_class",
        }
    }
}

/// Provenance record attached to every resolved item, identifying the
/// entity that directly contributed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub name: String,
    pub href: String,
}

impl SourceRef {
    pub fn new(kind: EntityKind, name: &str, links: &dyn EntityLinks) -> Self {
        Self {
            kind,
            name: name.to_string(),
            href: links.href_for(kind, name),
        }
    }
}

/// Seam through which the presentation layer supplies entity locators.
/// The resolution engine annotates results with hrefs but never decides
/// what they look like.
pub trait EntityLinks: Send + Sync {
    fn href_for(&self, kind: EntityKind, name: &str) -> String;
}

/// Link builder producing bare relative paths; used by tests and any
/// caller that has no request context.
pub struct NoLinks;

impl EntityLinks for NoLinks {
    fn href_for(&self, kind: EntityKind, name: &str) -> String {
        format!("/api/{}/{}", kind.path_segment(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ref_serializes_type_discriminator() {
        let source = SourceRef::new(EntityKind::NodeGroup, "base", &NoLinks);
        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["type"], "node_group");
        assert_eq!(json["name"], "base");
        assert_eq!(json["href"], "/api/node_group/base");
    }
}
