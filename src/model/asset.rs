//! Asset domain model
//!
//! Every graph node is reconstructed per request into one of the [`Asset`]
//! variants. The variant is a pure function of the `type` field.

use super::kind::{AssetFamily, AssetKind, AssetStatus, AssetType};
use super::row::RowView;
use crate::graph::Row;
use crate::locale::Locale;
use crate::localize::LocalizedTag;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Fields common to all assets
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBlock {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub status: AssetStatus,
    pub short_description: String,
    pub long_description: String,
    pub tags: Vec<LocalizedTag>,
    pub tag_order: Vec<String>,
    pub organizational_level: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub version: String,
    pub author: String,
    pub contributor: Vec<String>,
}

impl AssetBlock {
    pub fn from_row(view: &RowView<'_>) -> Self {
        let raw_status = view.string("status");
        AssetBlock {
            id: view.string("id"),
            slug: view.string("slug"),
            name: view.text("name"),
            kind: AssetKind::from_raw(&view.string("type")),
            status: AssetStatus::parse(&raw_status).unwrap_or_default(),
            short_description: view.text("shortDescription"),
            long_description: view.text("longDescription"),
            tags: view.tags(),
            tag_order: view.strings("tagOrder"),
            organizational_level: view.strings("organizationalLevel"),
            created_at: view.timestamp("createdAt"),
            updated_at: view.timestamp("updatedAt"),
            version: view.string("version"),
            author: view.string("author"),
            contributor: view.strings("contributor"),
        }
    }
}

/// Macro-cluster, cluster, cluster view or segment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralAsset {
    #[serde(flatten)]
    pub base: AssetBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub framework: String,
    pub children: Vec<Asset>,
    pub children_count: usize,
}

impl StructuralAsset {
    pub fn from_row(view: &RowView<'_>, base: AssetBlock) -> Self {
        StructuralAsset {
            base,
            parent_id: view.opt_string("parentId").filter(|p| !p.is_empty()),
            framework: view.string("framework"),
            children: Vec::new(),
            children_count: view.count("childrenCount").unwrap_or(0),
        }
    }

    /// Attach hydrated children; the count always follows the list
    pub fn set_children(&mut self, children: Vec<Asset>) {
        self.children_count = children.len();
        self.children = children;
    }
}

/// Concept, method, tool or technology
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAsset {
    #[serde(flatten)]
    pub base: AssetBlock,
    pub maturity_level: String,
    pub complexity_level: String,
    pub decision_type: String,
    pub value_stream_stage: String,
    pub organizational_maturity: String,
    pub cognitive_load: String,
    pub vendor: String,
    pub principles: Vec<String>,
    pub risks: Vec<String>,
    pub benefits: Vec<String>,
    pub limitations: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub best_practices: Vec<String>,
    pub anti_patterns: Vec<String>,
    pub prerequisites: Vec<String>,
    pub use_cases: Vec<Value>,
    pub scenarios: Vec<Value>,
    pub examples: Vec<Value>,
    pub tradeoff_matrix: Value,
    pub metrics: Vec<Value>,
    pub external_resources: Vec<Value>,
}

impl ContentAsset {
    pub fn from_row(view: &RowView<'_>, base: AssetBlock) -> Self {
        ContentAsset {
            base,
            maturity_level: view.string("maturityLevel"),
            complexity_level: view.string("complexityLevel"),
            decision_type: view.string("decisionType"),
            value_stream_stage: view.string("valueStreamStage"),
            organizational_maturity: view.string("organizationalMaturity"),
            cognitive_load: view.string("cognitiveLoad"),
            vendor: view.string("vendor"),
            principles: view.strings("principles"),
            risks: view.strings("risks"),
            benefits: view.strings("benefits"),
            limitations: view.strings("limitations"),
            implementation_steps: view.strings("implementationSteps"),
            best_practices: view.strings("bestPractices"),
            anti_patterns: view.strings("antiPatterns"),
            prerequisites: view.strings("prerequisites"),
            use_cases: view.list("useCases"),
            scenarios: view.list("scenarios"),
            examples: view.list("examples"),
            tradeoff_matrix: view.object("tradeoffMatrix"),
            metrics: view.list("metrics"),
            external_resources: view.list("externalResources"),
        }
    }
}

/// Role; no fields beyond the base yet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextAsset {
    #[serde(flatten)]
    pub base: AssetBlock,
}

/// Canonical in-memory representation of a graph node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Asset {
    Structural(StructuralAsset),
    Content(ContentAsset),
    Context(ContextAsset),
    /// The `type` field named a type this build does not know
    Unknown(AssetBlock),
}

impl Asset {
    pub fn from_row(row: &Row, locale: &Locale) -> Asset {
        let view = RowView::new(row, locale);
        let base = AssetBlock::from_row(&view);
        match base.kind.known().map(|t| t.family()) {
            Some(AssetFamily::Structural) => Asset::Structural(StructuralAsset::from_row(&view, base)),
            Some(AssetFamily::Content) => Asset::Content(ContentAsset::from_row(&view, base)),
            Some(AssetFamily::Context) => Asset::Context(ContextAsset { base }),
            None => {
                warn!(
                    "Unknown asset type '{}' for node '{}'; serving base fields only",
                    base.kind.as_str(),
                    base.id
                );
                Asset::Unknown(base)
            }
        }
    }

    pub fn base(&self) -> &AssetBlock {
        match self {
            Asset::Structural(a) => &a.base,
            Asset::Content(a) => &a.base,
            Asset::Context(a) => &a.base,
            Asset::Unknown(base) => base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    pub fn slug(&self) -> &str {
        &self.base().slug
    }

    pub fn asset_type(&self) -> Option<AssetType> {
        self.base().kind.known()
    }

    pub fn into_structural(self) -> Option<StructuralAsset> {
        match self {
            Asset::Structural(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<ContentAsset> {
        match self {
            Asset::Content(a) => Some(a),
            _ => None,
        }
    }
}

/// Light projection of a content asset used in matrix cells
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPreview {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub status: AssetStatus,
    pub short_description: String,
    pub tags: Vec<LocalizedTag>,
}

impl AssetPreview {
    pub fn from_row(row: &Row, locale: &Locale) -> Self {
        let view = RowView::new(row, locale);
        AssetPreview {
            id: view.string("id"),
            slug: view.string("slug"),
            name: view.text("name"),
            kind: AssetKind::from_raw(&view.string("type")),
            status: AssetStatus::parse(&view.string("status")).unwrap_or_default(),
            short_description: view.text("shortDescription"),
            tags: view.tags(),
        }
    }
}

/// Minimal per-locale index projection; carries no heavy content fields
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogIndexRecord {
    pub id: String,
    pub kind: AssetKind,
    pub slug: String,
    pub status: AssetStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub language: Locale,
    pub tags: Vec<String>,
    pub tag_order: Vec<String>,
}

impl CatalogIndexRecord {
    /// `fetched_for` is the locale the row was read under; it is used when
    /// the row carries no `language` of its own.
    pub fn from_row(row: &Row, fetched_for: &Locale) -> Self {
        let view = RowView::new(row, fetched_for);
        let language = view
            .opt_string("language")
            .and_then(|l| Locale::parse(&l))
            .unwrap_or_else(|| fetched_for.clone());
        CatalogIndexRecord {
            id: view.string("id"),
            kind: AssetKind::from_raw(&view.string("type")),
            slug: view.string("slug"),
            status: AssetStatus::parse(&view.string("status")).unwrap_or_default(),
            created_at: view.timestamp("createdAt"),
            updated_at: view.timestamp("updatedAt"),
            language,
            tags: view.tag_slugs(),
            tag_order: view.strings("tagOrder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_variant_selected_by_type() {
        let en = Locale::english();
        let seg = Asset::from_row(&row(json!({"id": "s1", "type": "SEGMENT", "childrenCount": 4})), &en);
        let tool = Asset::from_row(&row(json!({"id": "t1", "type": "TOOL"})), &en);
        let role = Asset::from_row(&row(json!({"id": "r1", "type": "ROLE"})), &en);
        let odd = Asset::from_row(&row(json!({"id": "x1", "type": "PLAYBOOK"})), &en);

        assert!(matches!(&seg, Asset::Structural(s) if s.children_count == 4));
        assert!(matches!(tool, Asset::Content(_)));
        assert!(matches!(role, Asset::Context(_)));
        assert!(matches!(&odd, Asset::Unknown(b) if b.kind.as_str() == "PLAYBOOK"));
        assert_eq!(odd.asset_type(), None);
    }

    #[test]
    fn test_content_defaults_and_rehydration() {
        let en = Locale::english();
        let asset = Asset::from_row(
            &row(json!({
                "id": "m1",
                "type": "METHOD",
                "slug": "event-storming",
                "name": "Event Storming",
                "benefits": "[\"shared language\"]",
                "risks": "{not json",
                "useCases": [{"title": "Kickoff"}],
                "status": "published"
            })),
            &en,
        );
        let content = asset.into_content().unwrap();
        assert_eq!(content.benefits, vec!["shared language"]);
        assert!(content.risks.is_empty());
        assert_eq!(content.use_cases.len(), 1);
        assert_eq!(content.base.status, AssetStatus::Published);
        assert_eq!(content.vendor, "");
        assert_eq!(content.tradeoff_matrix, json!({}));
    }

    #[test]
    fn test_serialized_shape_is_flat_camel_case() {
        let en = Locale::english();
        let asset = Asset::from_row(&row(json!({"id": "s1", "type": "SEGMENT", "slug": "s"})), &en);
        let out = serde_json::to_value(&asset).unwrap();
        assert_eq!(out["type"], "SEGMENT");
        assert_eq!(out["childrenCount"], 0);
        assert_eq!(out["shortDescription"], "");
        assert!(out["children"].as_array().unwrap().is_empty());
        assert!(out.get("createdAt").is_none());
    }

    #[test]
    fn test_set_children_recomputes_count() {
        let en = Locale::english();
        let mut seg = Asset::from_row(&row(json!({"id": "s1", "type": "SEGMENT", "childrenCount": 9})), &en)
            .into_structural()
            .unwrap();
        let child = Asset::from_row(&row(json!({"id": "t1", "type": "TOOL"})), &en);
        seg.set_children(vec![child]);
        assert_eq!(seg.children_count, 1);
    }

    #[test]
    fn test_index_record_language() {
        let de = Locale::parse("de").unwrap();
        let rec = CatalogIndexRecord::from_row(
            &row(json!({"id": "t1", "type": "TOOL", "slug": "a", "tags": {"b": {}, "a": {}}})),
            &de,
        );
        assert_eq!(rec.language, de);
        assert_eq!(rec.tags, vec!["a", "b"]);
    }
}
