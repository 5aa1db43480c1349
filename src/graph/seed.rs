//! Graph fixtures
//!
//! Loads a knowledge graph from a JSON or YAML document:
//!
//! ```yaml
//! nodes:
//!   - type: CLUSTER
//!     properties: { id: c-1, slug: delivery, name_en: Delivery, name_de: Lieferung }
//! edges:
//!   - { from: c-1, to: v-1 }                       # CONTAINS by default
//!   - { from: tool-a, to: role-po, type: CONCERNS_ROLE }
//! ```

use super::property::{PropertyMap, PropertyValue};
use super::store::{GraphError, GraphStore};
use super::types::EdgeType;
use crate::model::AssetType;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Unknown node type '{0}'")]
    UnknownType(String),

    #[error("Node #{0} has no 'id' property")]
    MissingId(usize),

    #[error("Edge references unknown node '{0}'")]
    UnknownNode(String),
}

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug, Deserialize)]
pub struct SeedGraph {
    #[serde(default)]
    pub nodes: Vec<SeedNode>,
    #[serde(default)]
    pub edges: Vec<SeedEdge>,
}

#[derive(Debug, Deserialize)]
pub struct SeedNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SeedEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
}

fn default_edge_type() -> String {
    EdgeType::CONTAINS.to_string()
}

impl SeedGraph {
    pub fn from_json(text: &str) -> SeedResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_yaml(text: &str) -> SeedResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a fixture; `.yaml`/`.yml` files are parsed as YAML, anything
    /// else as JSON
    pub fn from_path(path: impl AsRef<Path>) -> SeedResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            _ => Self::from_json(&text),
        }
    }

    /// Build a store. Node `type` becomes both the label and the `type`
    /// property.
    pub fn into_store(self) -> SeedResult<GraphStore> {
        let mut store = GraphStore::new();
        let mut ids = BTreeMap::new();

        for (position, node) in self.nodes.into_iter().enumerate() {
            let asset_type =
                AssetType::parse(&node.node_type).ok_or_else(|| SeedError::UnknownType(node.node_type.clone()))?;
            let mut properties: PropertyMap = node
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
                .collect();
            properties.insert("type".to_string(), PropertyValue::from(asset_type.as_str()));

            let asset_id = properties
                .get("id")
                .and_then(PropertyValue::as_string)
                .map(str::to_string)
                .ok_or(SeedError::MissingId(position))?;
            let node_id = store.create_node_with_properties(vec![asset_type.label()], properties)?;
            ids.insert(asset_id, node_id);
        }

        for edge in self.edges {
            let source = *ids.get(&edge.from).ok_or_else(|| SeedError::UnknownNode(edge.from.clone()))?;
            let target = *ids.get(&edge.to).ok_or_else(|| SeedError::UnknownNode(edge.to.clone()))?;
            store.create_edge(source, target, edge.edge_type)?;
        }

        info!(
            "Loaded graph fixture: {} nodes, {} edges",
            store.node_count(),
            store.edge_count()
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = r#"
nodes:
  - type: cluster
    properties: { id: c-1, slug: delivery, name_en: Delivery }
  - type: CLUSTER_VIEW
    properties: { id: v-1, slug: delivery-view }
edges:
  - { from: c-1, to: v-1 }
"#;

    #[test]
    fn test_yaml_fixture() {
        let store = SeedGraph::from_yaml(FIXTURE).unwrap().into_store().unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 1);
        let cluster = store.node_by_asset_id("c-1").unwrap();
        assert_eq!(cluster.get_property("type").and_then(|v| v.as_string()), Some("CLUSTER"));
    }

    #[test]
    fn test_fixture_from_path() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        let store = SeedGraph::from_path(file.path()).unwrap().into_store().unwrap();
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_fixture_errors() {
        let unknown_edge = r#"{"nodes": [{"type": "TOOL", "properties": {"id": "t"}}], "edges": [{"from": "t", "to": "x"}]}"#;
        assert!(matches!(
            SeedGraph::from_json(unknown_edge).unwrap().into_store(),
            Err(SeedError::UnknownNode(id)) if id == "x"
        ));

        let bad_type = r#"{"nodes": [{"type": "PLAYBOOK", "properties": {"id": "p"}}]}"#;
        assert!(matches!(
            SeedGraph::from_json(bad_type).unwrap().into_store(),
            Err(SeedError::UnknownType(_))
        ));

        let no_id = r#"{"nodes": [{"type": "TOOL"}]}"#;
        assert!(matches!(
            SeedGraph::from_json(no_id).unwrap().into_store(),
            Err(SeedError::MissingId(0))
        ));
    }
}
