//! Graph node
//!
//! A node carries one or more labels and a property map. Knowledge-graph
//! nodes are labelled with their asset type and hold their opaque asset
//! identifier in the `id` property.

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Property key holding the asset's opaque identifier
pub const ASSET_ID_KEY: &str = "id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Internal slot identifier
    pub id: NodeId,

    /// Labels of this node
    pub labels: HashSet<Label>,

    /// Properties, including locale-suffixed keys
    pub properties: PropertyMap,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<Label>) -> Self {
        let mut labels = HashSet::new();
        labels.insert(label.into());
        Node {
            id,
            labels,
            properties: PropertyMap::new(),
        }
    }

    pub fn new_with_properties(id: NodeId, labels: Vec<Label>, properties: PropertyMap) -> Self {
        Node {
            id,
            labels: labels.into_iter().collect(),
            properties,
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// The asset identifier stored under `id`
    pub fn asset_id(&self) -> Option<&str> {
        self.get_property(ASSET_ID_KEY).and_then(PropertyValue::as_string)
    }

    /// First label in sorted order; used as the row `type`
    pub fn primary_label(&self) -> Option<&Label> {
        self.labels.iter().min()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}
