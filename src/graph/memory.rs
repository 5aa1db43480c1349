//! Embedded graph reader over an in-memory `GraphStore`
//!
//! Implements the read-port projection contract: localized properties are
//! stored under `<field>_<lang>` keys and projected as `<field>`, taking the
//! requested language first, then English, then an unsuffixed `<field>`.
//! Only suffixes naming a known locale are split, so `parent_id` stays whole.

use super::node::Node;
use super::port::{GraphReader, ReadQuery, ReadResult, Row};
use super::store::GraphStore;
use super::types::{EdgeType, NodeId};
use crate::locale::{Locale, LocaleSettings, FALLBACK_LOCALE};
use crate::localize::compare_labels;
use crate::model::AssetType;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-process [`GraphReader`], the embedded counterpart of a remote graph
/// database driver
#[derive(Clone)]
pub struct MemoryGraph {
    store: Arc<RwLock<GraphStore>>,
    locales: Vec<Locale>,
}

impl MemoryGraph {
    pub fn new(store: GraphStore) -> Self {
        Self::with_store(Arc::new(RwLock::new(store)))
    }

    pub fn with_store(store: Arc<RwLock<GraphStore>>) -> Self {
        Self {
            store,
            locales: LocaleSettings::default().supported,
        }
    }

    /// Set the locales whose `_<lang>` key suffixes are treated as translations
    pub fn with_locales(mut self, locales: Vec<Locale>) -> Self {
        self.locales = locales;
        self
    }

    pub fn store(&self) -> &Arc<RwLock<GraphStore>> {
        &self.store
    }
}

#[async_trait]
impl GraphReader for MemoryGraph {
    async fn run_read_query(&self, query: &ReadQuery, lang: &Locale) -> ReadResult<Vec<Row>> {
        let store = self.store.read().await;
        let reader = Projector {
            store: &store,
            lang,
            locales: &self.locales,
        };
        let rows = reader.run(query);
        debug!("{} ({}) -> {} rows", query.name(), lang, rows.len());
        Ok(rows)
    }
}

/// Split `name_de` into `("name", "de")` when `de` is one of `locales`
fn split_localized_key<'k>(key: &'k str, locales: &[Locale]) -> Option<(&'k str, &'k str)> {
    let (base, suffix) = key.rsplit_once('_')?;
    (!base.is_empty() && locales.iter().any(|l| l.as_str() == suffix)).then_some((base, suffix))
}

/// Project node properties for one language
pub fn project_node(node: &Node, lang: &Locale, locales: &[Locale]) -> Row {
    let mut row = Row::new();
    let mut localized: HashMap<&str, HashMap<&str, Value>> = HashMap::new();

    for (key, value) in &node.properties {
        match split_localized_key(key, locales) {
            Some((base, suffix)) => {
                if !value.is_blank() {
                    localized.entry(base).or_default().insert(suffix, value.to_json());
                }
            }
            None => {
                row.insert(key.clone(), value.to_json());
            }
        }
    }

    for (base, mut by_lang) in localized {
        let picked = by_lang
            .remove(lang.as_str())
            .or_else(|| by_lang.remove(FALLBACK_LOCALE));
        if let Some(value) = picked {
            row.insert(base.to_string(), value);
        }
    }

    if !row.contains_key("type") {
        if let Some(label) = node.primary_label() {
            row.insert("type".to_string(), Value::String(label.to_string()));
        }
    }
    row
}

fn has_content_in(node: &Node, lang: &Locale) -> bool {
    node.get_property(&format!("name_{}", lang))
        .map(|v| !v.is_blank())
        .unwrap_or(false)
}

struct Projector<'a> {
    store: &'a GraphStore,
    lang: &'a Locale,
    locales: &'a [Locale],
}

impl<'a> Projector<'a> {
    fn run(&self, query: &ReadQuery) -> Vec<Row> {
        match query {
            ReadQuery::NodesByType { types } => {
                let nodes = types.iter().flat_map(|t| self.store.get_nodes_by_label(&t.label()));
                self.listing(nodes.collect(), None)
            }
            ReadQuery::NodeBySlug { asset_type, slug } => self
                .store
                .get_nodes_by_label(&asset_type.label())
                .into_iter()
                .find(|n| n.get_property("slug").and_then(|v| v.as_string()) == Some(slug.as_str()))
                .map(|n| vec![self.with_count(n)])
                .unwrap_or_default(),
            ReadQuery::NodeById { id } => self
                .store
                .node_by_asset_id(id)
                .map(|n| vec![self.with_count(n)])
                .unwrap_or_default(),
            ReadQuery::NodesById { ids } => {
                let nodes = ids.iter().filter_map(|id| self.store.node_by_asset_id(id));
                self.listing(nodes.collect(), None)
            }
            ReadQuery::ChildrenOf { parent_id, child_type } => {
                let Some(parent) = self.store.node_by_asset_id(parent_id) else {
                    return Vec::new();
                };
                let children = self
                    .children(parent.id)
                    .into_iter()
                    .filter(|c| child_type.map_or(true, |t| c.has_label(&t.label())))
                    .collect();
                self.listing(children, Some(parent_id))
            }
            ReadQuery::SegmentContents { segment_ids, types } => {
                let mut rows = Vec::new();
                for segment_id in segment_ids {
                    let Some(segment) = self.store.node_by_asset_id(segment_id) else {
                        continue;
                    };
                    let contents = self.children(segment.id).into_iter().filter(|c| is_any(c, types)).collect();
                    rows.extend(self.tagged(contents, "segmentId", segment_id));
                }
                rows
            }
            ReadQuery::RoleContents { role_ids, cluster_id, types } => {
                let scope = self
                    .store
                    .node_by_asset_id(cluster_id)
                    .map(|c| self.reachable(c.id))
                    .unwrap_or_default();
                let mut rows = Vec::new();
                for role_id in role_ids {
                    let Some(role) = self.store.node_by_asset_id(role_id) else {
                        continue;
                    };
                    let mut related = self.store.in_neighbors(role.id, EdgeType::CONCERNS_ROLE);
                    related.extend(self.store.out_neighbors(role.id, EdgeType::CONCERNS_ROLE));
                    let contents = dedup(related)
                        .into_iter()
                        .filter(|c| is_any(c, types) && scope.contains(&c.id))
                        .collect();
                    rows.extend(self.tagged(contents, "roleId", role_id));
                }
                rows
            }
            ReadQuery::CatalogIndex { types } => types
                .iter()
                .flat_map(|t| self.store.get_nodes_by_label(&t.label()))
                .filter(|n| has_content_in(n, self.lang))
                .map(|n| self.index_row(n))
                .collect(),
        }
    }

    fn children(&self, id: NodeId) -> Vec<&'a Node> {
        dedup(self.store.out_neighbors(id, EdgeType::CONTAINS))
    }

    /// Structural child count with cluster views counted through
    fn children_count(&self, id: NodeId) -> usize {
        let view = AssetType::ClusterView.label();
        self.children(id)
            .into_iter()
            .map(|c| {
                if c.has_label(&view) {
                    self.children(c.id).len()
                } else {
                    1
                }
            })
            .sum()
    }

    /// Every node reachable over CONTAINS edges
    fn reachable(&self, root: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in self.children(id) {
                if seen.insert(child.id) {
                    stack.push(child.id);
                }
            }
        }
        seen
    }

    fn with_count(&self, node: &Node) -> Row {
        let mut row = project_node(node, self.lang, self.locales);
        row.insert("childrenCount".to_string(), Value::from(self.children_count(node.id)));
        row
    }

    fn listing(&self, nodes: Vec<&Node>, parent_id: Option<&str>) -> Vec<Row> {
        let mut rows: Vec<Row> = dedup(nodes).into_iter().map(|n| self.with_count(n)).collect();
        if let Some(parent_id) = parent_id {
            for row in &mut rows {
                row.entry("parentId")
                    .or_insert_with(|| Value::String(parent_id.to_string()));
            }
        }
        sort_rows(&mut rows);
        rows
    }

    fn tagged(&self, nodes: Vec<&Node>, key: &str, value: &str) -> Vec<Row> {
        let mut rows: Vec<Row> = nodes
            .into_iter()
            .map(|n| {
                let mut row = project_node(n, self.lang, self.locales);
                row.insert(key.to_string(), Value::String(value.to_string()));
                row
            })
            .collect();
        sort_rows(&mut rows);
        rows
    }

    fn index_row(&self, node: &Node) -> Row {
        let full = project_node(node, self.lang, self.locales);
        let mut row: Row = ["id", "type", "slug", "status", "createdAt", "updatedAt", "tags", "tagOrder"]
            .iter()
            .filter_map(|k| full.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect();
        row.insert("language".to_string(), Value::String(self.lang.to_string()));
        row
    }
}

fn is_any(node: &Node, types: &[AssetType]) -> bool {
    types.iter().any(|t| node.has_label(&t.label()))
}

fn dedup(nodes: Vec<&Node>) -> Vec<&Node> {
    let mut seen = HashSet::new();
    nodes.into_iter().filter(|n| seen.insert(n.id)).collect()
}

fn sort_rows(rows: &mut [Row]) {
    let text = |row: &Row, key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    rows.sort_by(|a, b| {
        compare_labels(&text(a, "name"), &text(b, "name"))
            .then_with(|| text(a, "slug").cmp(&text(b, "slug")))
    });
}
