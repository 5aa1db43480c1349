//! In-memory graph storage
//!
//! Backing store of the embedded read port. Nodes and edges live in arenas
//! indexed by their slot id; adjacency lists and a label index give O(1)
//! neighbourhood and type lookups.

use super::edge::Edge;
use super::node::Node;
use super::property::PropertyMap;
use super::types::{EdgeId, EdgeType, Label, NodeId};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur while building a graph
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Asset id '{0}' is already assigned to another node")]
    DuplicateAssetId(String),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// In-memory graph storage
///
/// - nodes: NodeId -> Node
/// - edges: EdgeId -> Edge
/// - outgoing / incoming: NodeId -> Vec<EdgeId>
/// - label_index: Label -> Set<NodeId>
/// - asset_index: asset `id` property -> NodeId
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
    label_index: HashMap<Label, HashSet<NodeId>>,
    asset_index: HashMap<String, NodeId>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with a single label and no properties
    pub fn create_node(&mut self, label: impl Into<Label>) -> NodeId {
        let node_id = NodeId::new(self.nodes.len() as u64);
        let node = Node::new(node_id, label);
        self.insert(node);
        node_id
    }

    /// Create a node with labels and properties.
    ///
    /// The asset `id` property, when present, must be unique across the graph.
    pub fn create_node_with_properties(
        &mut self,
        labels: Vec<Label>,
        properties: PropertyMap,
    ) -> GraphResult<NodeId> {
        let node_id = NodeId::new(self.nodes.len() as u64);
        let node = Node::new_with_properties(node_id, labels, properties);
        if let Some(asset_id) = node.asset_id() {
            if self.asset_index.contains_key(asset_id) {
                return Err(GraphError::DuplicateAssetId(asset_id.to_string()));
            }
            self.asset_index.insert(asset_id.to_string(), node_id);
        }
        self.insert(node);
        Ok(node_id)
    }

    fn insert(&mut self, node: Node) {
        for label in &node.labels {
            self.label_index
                .entry(label.clone())
                .or_default()
                .insert(node.id);
        }
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.nodes.push(node);
    }

    /// Create a directed edge between two existing nodes
    pub fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: impl Into<EdgeType>,
    ) -> GraphResult<EdgeId> {
        if !self.has_node(source) {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if !self.has_node(target) {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId(self.edges.len() as u64);
        self.edges.push(Edge::new(edge_id, source, target, edge_type));
        self.outgoing[source.index()].push(edge_id);
        self.incoming[target.index()].push(edge_id);
        Ok(edge_id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Look up a node by its asset `id` property
    pub fn node_by_asset_id(&self, asset_id: &str) -> Option<&Node> {
        self.asset_index
            .get(asset_id)
            .and_then(|id| self.get_node(*id))
    }

    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.outgoing
            .get(node_id.index())
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e.index())).collect())
            .unwrap_or_default()
    }

    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.incoming
            .get(node_id.index())
            .map(|ids| ids.iter().filter_map(|e| self.edges.get(e.index())).collect())
            .unwrap_or_default()
    }

    /// Targets of outgoing edges of the given type
    pub fn out_neighbors(&self, node_id: NodeId, edge_type: &str) -> Vec<&Node> {
        self.get_outgoing_edges(node_id)
            .into_iter()
            .filter(|e| e.is_type(edge_type))
            .filter_map(|e| self.get_node(e.target))
            .collect()
    }

    /// Sources of incoming edges of the given type
    pub fn in_neighbors(&self, node_id: NodeId, edge_type: &str) -> Vec<&Node> {
        self.get_incoming_edges(node_id)
            .into_iter()
            .filter(|e| e.is_type(edge_type))
            .filter_map(|e| self.get_node(e.source))
            .collect()
    }

    pub fn get_nodes_by_label(&self, label: &Label) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self
            .label_index
            .get(label)
            .map(|ids| ids.iter().filter_map(|id| self.get_node(*id)).collect())
            .unwrap_or_default();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
