//! Graph read port
//!
//! The aggregation layer reaches the graph only through [`GraphReader`]:
//! one capability, run a named read query for a locale and get flat rows
//! back. Rows are already locale-resolved: a field such as `benefits` holds
//! the value of `benefits_<lang>`, falling back to `benefits_en`.
//!
//! Row conventions shared by every implementation:
//! - every row has `id`, `type` and `slug`
//! - listing queries add `childrenCount`, counting structural children with
//!   CLUSTER_VIEW nodes treated as transparent (a cluster counts its segments)
//! - rows are ordered by localized `name`, then `slug`

use crate::locale::Locale;
use crate::model::AssetType;
use async_trait::async_trait;
use thiserror::Error;

/// A flat, locale-resolved projection of one node
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Failure of the underlying graph read
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Graph backend unavailable: {0}")]
    Unavailable(String),

    #[error("Graph query failed: {0}")]
    Query(String),
}

pub type ReadResult<T> = Result<T, ReadError>;

/// The reads the aggregation layer issues
#[derive(Debug, Clone, PartialEq)]
pub enum ReadQuery {
    /// All nodes of the given types, with `childrenCount`
    NodesByType { types: Vec<AssetType> },

    /// The node of a type with the given slug (zero or one row)
    NodeBySlug { asset_type: AssetType, slug: String },

    /// The node with the given asset id (zero or one row)
    NodeById { id: String },

    /// Nodes with any of the given asset ids
    NodesById { ids: Vec<String> },

    /// Direct structural children of a node, optionally of a single type,
    /// with `childrenCount`
    ChildrenOf {
        parent_id: String,
        child_type: Option<AssetType>,
    },

    /// Content of the given types contained by the segments; each row
    /// carries the containing `segmentId`
    SegmentContents {
        segment_ids: Vec<String>,
        types: Vec<AssetType>,
    },

    /// Content of the given types related to the roles and reachable from
    /// the cluster; each row carries the related `roleId`
    RoleContents {
        role_ids: Vec<String>,
        cluster_id: String,
        types: Vec<AssetType>,
    },

    /// Minimal index projection of the nodes of the given types that have
    /// content in the requested locale; rows carry `language`
    CatalogIndex { types: Vec<AssetType> },
}

impl ReadQuery {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ReadQuery::NodesByType { .. } => "nodes_by_type",
            ReadQuery::NodeBySlug { .. } => "node_by_slug",
            ReadQuery::NodeById { .. } => "node_by_id",
            ReadQuery::NodesById { .. } => "nodes_by_id",
            ReadQuery::ChildrenOf { .. } => "children_of",
            ReadQuery::SegmentContents { .. } => "segment_contents",
            ReadQuery::RoleContents { .. } => "role_contents",
            ReadQuery::CatalogIndex { .. } => "catalog_index",
        }
    }
}

/// Read access to the knowledge graph.
///
/// Implementations are stateless from the caller's point of view and may be
/// called concurrently.
#[async_trait]
pub trait GraphReader: Send + Sync {
    async fn run_read_query(&self, query: &ReadQuery, lang: &Locale) -> ReadResult<Vec<Row>>;
}
