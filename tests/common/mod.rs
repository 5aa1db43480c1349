use knowgraph::graph::{EdgeType, GraphStore, MemoryGraph, NodeId, PropertyMap, PropertyValue, SeedGraph};
use knowgraph::model::AssetType;
use knowgraph::GraphReader;
use std::sync::Arc;

/// The bundled sample graph
#[allow(dead_code)]
pub fn sample_reader() -> Arc<dyn GraphReader> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/seed.yaml");
    let store = SeedGraph::from_path(path).unwrap().into_store().unwrap();
    Arc::new(MemoryGraph::new(store))
}

#[allow(dead_code)]
pub fn add_node(store: &mut GraphStore, asset_type: AssetType, id: &str, name: &str) -> NodeId {
    let mut props = PropertyMap::new();
    props.insert("id".to_string(), PropertyValue::from(id));
    props.insert("slug".to_string(), PropertyValue::from(id));
    props.insert("name_en".to_string(), PropertyValue::from(name));
    props.insert("type".to_string(), PropertyValue::from(asset_type.as_str()));
    store
        .create_node_with_properties(vec![asset_type.label()], props)
        .unwrap()
}

#[allow(dead_code)]
pub fn contains(store: &mut GraphStore, parent: NodeId, child: NodeId) {
    store.create_edge(parent, child, EdgeType::contains()).unwrap();
}
