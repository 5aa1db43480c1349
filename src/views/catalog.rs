//! Flat catalog of content assets

use super::error::{ViewError, ViewResult};
use crate::graph::{GraphReader, ReadQuery};
use crate::locale::Locale;
use crate::model::{Asset, AssetType, ContentAsset};
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogView {
    reader: Arc<dyn GraphReader>,
}

impl CatalogView {
    pub fn new(reader: Arc<dyn GraphReader>) -> Self {
        Self { reader }
    }

    /// Every content asset, in server order
    pub async fn list(&self, lang: &Locale) -> ViewResult<Vec<ContentAsset>> {
        let query = ReadQuery::NodesByType {
            types: AssetType::CONTENT.to_vec(),
        };
        let rows = self.reader.run_read_query(&query, lang).await?;
        Ok(rows
            .iter()
            .filter_map(|row| Asset::from_row(row, lang).into_content())
            .collect())
    }

    /// A content asset by type and slug; the type must be a content type
    pub async fn by_type_and_slug(&self, raw_type: &str, slug: &str, lang: &Locale) -> ViewResult<ContentAsset> {
        let asset_type = AssetType::parse(raw_type)
            .filter(AssetType::is_content)
            .ok_or_else(|| ViewError::bad_request(format!("Invalid content type '{}'", raw_type)))?;
        let query = ReadQuery::NodeBySlug {
            asset_type,
            slug: slug.to_string(),
        };
        let rows = self.reader.run_read_query(&query, lang).await?;
        rows.first()
            .and_then(|row| Asset::from_row(row, lang).into_content())
            .ok_or_else(|| ViewError::not_found(asset_type, slug))
    }

    /// A content asset by its opaque id
    pub async fn by_id(&self, id: &str, lang: &Locale) -> ViewResult<ContentAsset> {
        let query = ReadQuery::NodeById { id: id.to_string() };
        let rows = self.reader.run_read_query(&query, lang).await?;
        rows.first()
            .and_then(|row| Asset::from_row(row, lang).into_content())
            .ok_or_else(|| ViewError::not_found("Catalog item", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphStore, MemoryGraph, PropertyMap, PropertyValue};

    fn catalog() -> CatalogView {
        let mut store = GraphStore::new();
        for (t, id, name) in [
            (AssetType::Tool, "t1", "Kanban Board"),
            (AssetType::Method, "m1", "Event Storming"),
            (AssetType::Segment, "s1", "Segment"),
        ] {
            let mut props = PropertyMap::new();
            props.insert("id".to_string(), PropertyValue::from(id));
            props.insert("slug".to_string(), PropertyValue::from(id));
            props.insert("name_en".to_string(), PropertyValue::from(name));
            store.create_node_with_properties(vec![t.label()], props).unwrap();
        }
        CatalogView::new(Arc::new(MemoryGraph::new(store)))
    }

    #[tokio::test]
    async fn test_list_only_content() {
        let items = catalog().list(&Locale::english()).await.unwrap();
        let names: Vec<&str> = items.iter().map(|c| c.base.name.as_str()).collect();
        assert_eq!(names, vec!["Event Storming", "Kanban Board"]);
    }

    #[tokio::test]
    async fn test_lookups() {
        let catalog = catalog();
        let en = Locale::english();
        assert_eq!(catalog.by_type_and_slug("tool", "t1", &en).await.unwrap().base.id, "t1");
        assert_eq!(catalog.by_id("m1", &en).await.unwrap().base.slug, "m1");

        let missing = catalog.by_type_and_slug("TOOL", "zz", &en).await.unwrap_err();
        assert_eq!(missing.to_string(), "TOOL 'zz' not found");
        assert!(matches!(catalog.by_id("s1", &en).await, Err(ViewError::NotFound(_))));
        assert!(matches!(
            catalog.by_type_and_slug("SEGMENT", "s1", &en).await,
            Err(ViewError::BadRequest(_))
        ));
    }
}
