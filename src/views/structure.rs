//! Structural tree builder
//!
//! Assembles macro-cluster → cluster → segment → content hierarchies from
//! "direct children of X" reads. CLUSTER_VIEW nodes sit between a cluster
//! and its segments in the graph but are never surfaced: the children of a
//! cluster are the children of its cluster view.
//!
//! `childrenCount` has two sources. Nodes whose children were not hydrated
//! keep the server-computed count; hydrated nodes take `children.len()`.

use super::error::{ViewError, ViewResult};
use crate::graph::{GraphReader, ReadQuery};
use crate::locale::Locale;
use crate::model::{Asset, AssetType, StructuralAsset};
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// Identity of a node whose children are requested
#[derive(Debug, Clone)]
struct ParentRef {
    id: String,
    slug: String,
    asset_type: Option<AssetType>,
}

impl ParentRef {
    fn of(asset: &Asset) -> Self {
        ParentRef {
            id: asset.id().to_string(),
            slug: asset.slug().to_string(),
            asset_type: asset.asset_type(),
        }
    }
}

struct Slot {
    asset: Asset,
    parent: Option<usize>,
    children: Vec<usize>,
    expanded: bool,
}

#[derive(Clone)]
pub struct StructureBuilder {
    reader: Arc<dyn GraphReader>,
}

impl StructureBuilder {
    pub fn new(reader: Arc<dyn GraphReader>) -> Self {
        Self { reader }
    }

    /// All macro-clusters with their server-computed child counts
    pub async fn overview(&self, lang: &Locale) -> ViewResult<Vec<StructuralAsset>> {
        let rows = self
            .reader
            .run_read_query(&ReadQuery::NodesByType { types: vec![AssetType::MacroCluster] }, lang)
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| Asset::from_row(row, lang).into_structural())
            .collect())
    }

    /// Resolve a node by type and slug
    pub async fn find_node(&self, asset_type: AssetType, slug: &str, lang: &Locale) -> ViewResult<Asset> {
        let query = ReadQuery::NodeBySlug {
            asset_type,
            slug: slug.to_string(),
        };
        let rows = self.reader.run_read_query(&query, lang).await?;
        rows.first()
            .map(|row| Asset::from_row(row, lang))
            .ok_or_else(|| ViewError::not_found(type_name(asset_type), slug))
    }

    async fn find_structural(&self, asset_type: AssetType, slug: &str, lang: &Locale) -> ViewResult<StructuralAsset> {
        self.find_node(asset_type, slug, lang)
            .await?
            .into_structural()
            .ok_or_else(|| ViewError::not_found(type_name(asset_type), slug))
    }

    /// A macro-cluster with its clusters; clusters keep listing counts
    pub async fn macro_cluster(&self, slug: &str, lang: &Locale) -> ViewResult<StructuralAsset> {
        let root = self.find_structural(AssetType::MacroCluster, slug, lang).await?;
        self.build_tree(root, 1, lang).await
    }

    /// A cluster with its segments, each hydrated with its content
    pub async fn cluster(&self, slug: &str, lang: &Locale) -> ViewResult<StructuralAsset> {
        let root = self.find_structural(AssetType::Cluster, slug, lang).await?;
        self.build_tree(root, 2, lang).await
    }

    /// Segments of a cluster, reached through its cluster view
    pub async fn find_segments(&self, cluster_slug: &str, lang: &Locale) -> ViewResult<Vec<StructuralAsset>> {
        let cluster = self.find_node(AssetType::Cluster, cluster_slug, lang).await?;
        let segments = self.children_of(ParentRef::of(&cluster), lang).await?;
        Ok(segments.into_iter().filter_map(Asset::into_structural).collect())
    }

    /// Segments of the cluster with the given opaque id
    pub async fn find_segments_by_id(&self, cluster_id: &str, lang: &Locale) -> ViewResult<Vec<StructuralAsset>> {
        let rows = self
            .reader
            .run_read_query(&ReadQuery::NodeById { id: cluster_id.to_string() }, lang)
            .await?;
        let cluster = rows
            .first()
            .map(|row| Asset::from_row(row, lang))
            .filter(|asset| asset.asset_type() == Some(AssetType::Cluster))
            .ok_or_else(|| ViewError::not_found("Cluster", cluster_id))?;
        let segments = self.children_of(ParentRef::of(&cluster), lang).await?;
        Ok(segments.into_iter().filter_map(Asset::into_structural).collect())
    }

    /// Direct (view-transparent) children of the node with the given type and slug
    pub async fn find_children(&self, asset_type: AssetType, slug: &str, lang: &Locale) -> ViewResult<Vec<Asset>> {
        let parent = self.find_node(asset_type, slug, lang).await?;
        self.children_of(ParentRef::of(&parent), lang).await
    }

    async fn children_of(&self, parent: ParentRef, lang: &Locale) -> ViewResult<Vec<Asset>> {
        if parent.asset_type == Some(AssetType::Cluster) {
            let views = self
                .reader
                .run_read_query(
                    &ReadQuery::ChildrenOf {
                        parent_id: parent.id.clone(),
                        child_type: Some(AssetType::ClusterView),
                    },
                    lang,
                )
                .await?;
            let view_id = views
                .first()
                .and_then(|row| row.get("id"))
                .and_then(|id| id.as_str())
                .ok_or_else(|| {
                    ViewError::Integrity(format!("Cluster view for cluster '{}' not found", parent.slug))
                })?;
            if views.len() > 1 {
                warn!(
                    "Cluster '{}' has {} cluster views; using the first",
                    parent.slug,
                    views.len()
                );
            }
            let rows = self
                .reader
                .run_read_query(
                    &ReadQuery::ChildrenOf {
                        parent_id: view_id.to_string(),
                        child_type: Some(AssetType::Segment),
                    },
                    lang,
                )
                .await?;
            return Ok(rows.iter().map(|row| Asset::from_row(row, lang)).collect());
        }

        let rows = self
            .reader
            .run_read_query(
                &ReadQuery::ChildrenOf {
                    parent_id: parent.id,
                    child_type: None,
                },
                lang,
            )
            .await?;
        Ok(rows
            .iter()
            .map(|row| Asset::from_row(row, lang))
            .filter(|child| child.asset_type() != Some(AssetType::ClusterView))
            .collect())
    }

    /// Breadth-first expansion of `root`, `depth` levels deep. Every level
    /// is fetched concurrently. A child that is also one of its own
    /// ancestors is dropped.
    pub async fn build_tree(&self, root: StructuralAsset, depth: usize, lang: &Locale) -> ViewResult<StructuralAsset> {
        let mut arena = vec![Slot {
            asset: Asset::Structural(root),
            parent: None,
            children: Vec::new(),
            expanded: false,
        }];
        let mut frontier = vec![0usize];

        for level in 0..depth {
            let parents: Vec<(usize, ParentRef)> = frontier
                .iter()
                .filter(|idx| matches!(arena[**idx].asset, Asset::Structural(_)))
                .map(|idx| (*idx, ParentRef::of(&arena[*idx].asset)))
                .collect();
            if parents.is_empty() {
                break;
            }

            let fetched = try_join_all(
                parents
                    .iter()
                    .map(|(_, parent)| self.children_of(parent.clone(), lang)),
            )
            .await?;

            let mut next = Vec::new();
            for ((parent_idx, _), children) in parents.into_iter().zip(fetched) {
                arena[parent_idx].expanded = true;
                for child in children {
                    if is_ancestor(&arena, parent_idx, child.id()) {
                        warn!("Skipping cyclic structural edge to '{}'", child.id());
                        continue;
                    }
                    arena.push(Slot {
                        asset: child,
                        parent: Some(parent_idx),
                        children: Vec::new(),
                        expanded: false,
                    });
                    let child_idx = arena.len() - 1;
                    arena[parent_idx].children.push(child_idx);
                    next.push(child_idx);
                }
            }
            debug!("Tree level {} expanded to {} nodes", level + 1, next.len());
            frontier = next;
        }

        let mut slots: Vec<Option<Slot>> = arena.into_iter().map(Some).collect();
        match assemble(&mut slots, 0) {
            Some(Asset::Structural(tree)) => Ok(tree),
            _ => Err(ViewError::Integrity("Tree root is not a structural node".to_string())),
        }
    }
}

fn is_ancestor(arena: &[Slot], mut idx: usize, id: &str) -> bool {
    loop {
        if arena[idx].asset.id() == id {
            return true;
        }
        match arena[idx].parent {
            Some(parent) => idx = parent,
            None => return false,
        }
    }
}

fn assemble(slots: &mut [Option<Slot>], idx: usize) -> Option<Asset> {
    let slot = slots.get_mut(idx)?.take()?;
    let children: Vec<Asset> = slot
        .children
        .iter()
        .filter_map(|child| assemble(slots, *child))
        .collect();
    Some(match slot.asset {
        Asset::Structural(mut node) if slot.expanded => {
            node.set_children(children);
            Asset::Structural(node)
        }
        other => other,
    })
}

fn type_name(asset_type: AssetType) -> &'static str {
    match asset_type {
        AssetType::MacroCluster => "Macro-cluster",
        AssetType::Cluster => "Cluster",
        AssetType::Segment => "Segment",
        AssetType::ClusterView => "Cluster view",
        AssetType::Concept => "Concept",
        AssetType::Method => "Method",
        AssetType::Tool => "Tool",
        AssetType::Technology => "Technology",
        AssetType::Role => "Role",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, GraphStore, MemoryGraph, NodeId, PropertyMap, PropertyValue};

    fn add(store: &mut GraphStore, t: AssetType, id: &str) -> NodeId {
        let mut props = PropertyMap::new();
        props.insert("id".to_string(), PropertyValue::from(id));
        props.insert("slug".to_string(), PropertyValue::from(id));
        props.insert("name_en".to_string(), PropertyValue::from(id.to_uppercase()));
        props.insert("type".to_string(), PropertyValue::from(t.as_str()));
        store.create_node_with_properties(vec![t.label()], props).unwrap()
    }

    fn builder(store: GraphStore) -> StructureBuilder {
        StructureBuilder::new(Arc::new(MemoryGraph::new(store)))
    }

    #[tokio::test]
    async fn test_cluster_without_view_is_integrity_violation() {
        let mut store = GraphStore::new();
        add(&mut store, AssetType::Cluster, "lonely");
        let err = builder(store)
            .find_segments("lonely", &Locale::english())
            .await
            .unwrap_err();
        assert!(matches!(&err, ViewError::Integrity(m) if m.contains("lonely")));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let err = builder(GraphStore::new())
            .cluster("nope", &Locale::english())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Cluster 'nope' not found");
    }

    #[tokio::test]
    async fn test_shared_content_appears_under_each_segment() {
        let mut store = GraphStore::new();
        let c = add(&mut store, AssetType::Cluster, "c");
        let v = add(&mut store, AssetType::ClusterView, "v");
        let s1 = add(&mut store, AssetType::Segment, "s1");
        let s2 = add(&mut store, AssetType::Segment, "s2");
        let t = add(&mut store, AssetType::Tool, "t");
        for (a, b) in [(c, v), (v, s1), (v, s2), (s1, t), (s2, t)] {
            store.create_edge(a, b, EdgeType::contains()).unwrap();
        }

        let tree = builder(store).cluster("c", &Locale::english()).await.unwrap();
        assert_eq!(tree.children_count, 2);
        for segment in &tree.children {
            let Asset::Structural(segment) = segment else {
                panic!("expected segment");
            };
            assert_eq!(segment.children_count, 1);
            assert_eq!(segment.children[0].id(), "t");
        }
    }

    #[tokio::test]
    async fn test_cycle_is_cut() {
        let mut store = GraphStore::new();
        let a = add(&mut store, AssetType::Segment, "a");
        let b = add(&mut store, AssetType::Segment, "b");
        store.create_edge(a, b, EdgeType::contains()).unwrap();
        store.create_edge(b, a, EdgeType::contains()).unwrap();

        let structure = builder(store);
        let root = structure
            .find_node(AssetType::Segment, "a", &Locale::english())
            .await
            .unwrap()
            .into_structural()
            .unwrap();
        let tree = structure.build_tree(root, 5, &Locale::english()).await.unwrap();
        let Asset::Structural(b) = &tree.children[0] else {
            panic!("expected segment");
        };
        assert_eq!(b.base.id, "b");
        assert!(b.children.is_empty());
        assert_eq!(b.children_count, 0);
    }
}
