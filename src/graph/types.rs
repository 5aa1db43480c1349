//! Identifier and vocabulary types for the embedded knowledge graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena slot of a node inside a `GraphStore`.
///
/// Not to be confused with the asset `id` property, which is the opaque
/// identifier exposed to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        NodeId(id)
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena slot of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl EdgeId {
    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Node label; knowledge-graph nodes carry their asset type ("SEGMENT", "TOOL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label::new(s)
    }
}

/// Relationship type. The store only ever walks the two kinds below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeType(String);

impl EdgeType {
    /// Structural parent to child (macro-cluster, cluster, view, segment, content)
    pub const CONTAINS: &'static str = "CONTAINS";
    /// Content to role
    pub const CONCERNS_ROLE: &'static str = "CONCERNS_ROLE";

    pub fn contains() -> Self {
        EdgeType(Self::CONTAINS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EdgeType {
    fn from(s: String) -> Self {
        EdgeType(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new(3).to_string(), "#3");
        assert!(NodeId::new(1) < NodeId::new(2));
    }

    #[test]
    fn test_edge_type_vocabulary() {
        assert_eq!(EdgeType::contains().as_str(), EdgeType::CONTAINS);
        assert_eq!(EdgeType::from(EdgeType::CONCERNS_ROLE.to_string()).as_str(), "CONCERNS_ROLE");
        assert_eq!(Label::from("SEGMENT").to_string(), "SEGMENT");
    }
}
