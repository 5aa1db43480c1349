mod common;

use common::{add_node, contains, sample_reader};
use knowgraph::graph::{GraphStore, MemoryGraph};
use knowgraph::model::{Asset, AssetType};
use knowgraph::views::{CatalogView, StructureBuilder, ViewError};
use knowgraph::Locale;
use std::sync::Arc;

fn en() -> Locale {
    Locale::english()
}

/// Cluster X → view → [S1, S2]; S1 contains Tool A
fn scenario() -> StructureBuilder {
    let mut store = GraphStore::new();
    let x = add_node(&mut store, AssetType::Cluster, "x", "X");
    let view = add_node(&mut store, AssetType::ClusterView, "x-view", "X view");
    let s1 = add_node(&mut store, AssetType::Segment, "s1", "S1");
    let s2 = add_node(&mut store, AssetType::Segment, "s2", "S2");
    let a = add_node(&mut store, AssetType::Tool, "a", "Tool A");
    contains(&mut store, x, view);
    contains(&mut store, view, s1);
    contains(&mut store, view, s2);
    contains(&mut store, s1, a);
    StructureBuilder::new(Arc::new(MemoryGraph::new(store)))
}

#[tokio::test]
async fn test_find_segments_scenario() {
    let structure = scenario();

    let segments = structure.find_segments("x", &en()).await.unwrap();
    let summary: Vec<(&str, usize)> = segments
        .iter()
        .map(|s| (s.base.id.as_str(), s.children_count))
        .collect();
    assert_eq!(summary, vec![("s1", 1), ("s2", 0)]);

    let children = structure
        .find_children(AssetType::Segment, "s1", &en())
        .await
        .unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id(), "a");
    assert!(matches!(children[0], Asset::Content(_)));
}

#[tokio::test]
async fn test_cluster_children_skip_cluster_view() {
    let structure = scenario();

    let children = structure
        .find_children(AssetType::Cluster, "x", &en())
        .await
        .unwrap();
    assert_eq!(children.len(), 2);
    assert!(children
        .iter()
        .all(|c| c.asset_type() == Some(AssetType::Segment)));

    let tree = structure.cluster("x", &en()).await.unwrap();
    assert_eq!(tree.children_count, 2);
    assert!(tree
        .children
        .iter()
        .all(|c| c.asset_type() != Some(AssetType::ClusterView)));
}

#[tokio::test]
async fn test_sample_grid() {
    let structure = StructureBuilder::new(sample_reader());

    let overview = structure.overview(&en()).await.unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].base.slug, "product");
    assert_eq!(overview[0].children_count, 2);
    assert!(overview[0].children.is_empty());

    let product = structure.macro_cluster("product", &en()).await.unwrap();
    let clusters: Vec<&str> = product.children.iter().map(|c| c.slug()).collect();
    assert_eq!(clusters, vec!["delivery", "discovery"]);
    // Clusters are listed but not expanded
    let Asset::Structural(delivery) = &product.children[0] else {
        panic!("expected cluster");
    };
    assert_eq!(delivery.children_count, 2);
    assert!(delivery.children.is_empty());

    let de = Locale::parse("de").unwrap();
    let discovery = structure.cluster("discovery", &de).await.unwrap();
    assert_eq!(discovery.base.name, "Entdeckung");
    let segments: Vec<(&str, usize)> = discovery
        .children
        .iter()
        .filter_map(|c| match c {
            Asset::Structural(s) => Some((s.base.name.as_str(), s.children_count)),
            _ => None,
        })
        .collect();
    assert_eq!(segments, vec![("Ideenfindung", 1), ("Nutzerforschung", 2)]);
}

#[tokio::test]
async fn test_not_found_names_the_slug() {
    let structure = StructureBuilder::new(sample_reader());
    let err = structure.macro_cluster("nothing", &en()).await.unwrap_err();
    assert!(matches!(&err, ViewError::NotFound(m) if m.contains("nothing")));
}

#[tokio::test]
async fn test_sample_catalog_localization() {
    let catalog = CatalogView::new(sample_reader());
    let de = Locale::parse("de").unwrap();

    let method = catalog
        .by_type_and_slug("METHOD", "event-storming", &de)
        .await
        .unwrap();
    assert_eq!(method.benefits, vec!["Gemeinsame Sprache", "Schnelle Abstimmung"]);
    let tags: Vec<(&str, &str)> = method
        .base
        .tags
        .iter()
        .map(|t| (t.slug.as_str(), t.label.as_str()))
        .collect();
    assert_eq!(tags, vec![("modelling", "Modellierung"), ("workshop", "Workshop")]);

    // No German text: falls back to English
    let concept = catalog.by_id("k-jtbd", &de).await.unwrap();
    assert_eq!(concept.base.name, "Jobs to be Done");

    let all = catalog.list(&Locale::english()).await.unwrap();
    assert_eq!(all.len(), 4);
}
