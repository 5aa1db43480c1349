//! Multi-locale index merger
//!
//! Each requested locale is fetched independently and concurrently. Records
//! describing the same item, keyed by `(type, slug, id)`, collapse into one
//! [`IndexEntry`]. The merge keeps the newest timestamps, unions languages
//! and tag slugs, and takes the remaining scalars from the alphabetically
//! first language. It does not depend on fetch completion order.
//!
//! Ordering is `type`, then `slug`, then `id`; pagination slices the fully
//! merged and sorted list.

use super::error::{ViewError, ViewResult};
use crate::graph::{GraphReader, ReadQuery};
use crate::locale::{Locale, LocaleSettings};
use crate::model::{AssetKind, AssetStatus, AssetType, CatalogIndexRecord};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            default_limit: 100,
            max_limit: 1000,
        }
    }
}

impl IndexSettings {
    /// 1-based page; anything unparseable or zero is page 1
    pub fn page(&self, raw: Option<&str>) -> usize {
        raw.and_then(|r| r.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1)
    }

    pub fn limit(&self, raw: Option<&str>) -> usize {
        raw.and_then(|r| r.trim().parse::<usize>().ok())
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

/// Raw `/system/catalog/index` parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexParams {
    pub status: Option<String>,
    pub types: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub languages: Option<String>,
}

/// Raw `/public/sitemap/nodes` parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub langs: Option<String>,
    pub include_review: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexRequest {
    /// Accepted statuses; empty accepts any
    pub statuses: Vec<AssetStatus>,
    pub types: Vec<AssetType>,
    pub languages: Vec<Locale>,
    pub page: usize,
    pub limit: usize,
}

fn parse_types(raw: Option<&str>, default: &[AssetType]) -> ViewResult<Vec<AssetType>> {
    let mut types = Vec::new();
    for part in raw.unwrap_or_default().split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let asset_type =
            AssetType::parse(part).ok_or_else(|| ViewError::bad_request(format!("Invalid type '{}'", part)))?;
        if !types.contains(&asset_type) {
            types.push(asset_type);
        }
    }
    Ok(if types.is_empty() { default.to_vec() } else { types })
}

impl IndexRequest {
    pub fn system(params: &IndexParams, settings: &IndexSettings, locales: &LocaleSettings) -> ViewResult<Self> {
        let statuses = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => vec![AssetStatus::parse(raw)
                .ok_or_else(|| ViewError::bad_request(format!("Invalid status '{}'", raw)))?],
            None => Vec::new(),
        };
        Ok(IndexRequest {
            statuses,
            types: parse_types(params.types.as_deref(), &AssetType::CONTENT)?,
            languages: locales.resolve_many(params.languages.as_deref()),
            page: settings.page(params.page.as_deref()),
            limit: settings.limit(params.limit.as_deref()),
        })
    }

    /// Public nodes: published (and optionally in-review) assets of every
    /// type except cluster views and roles
    pub fn sitemap(params: &SitemapParams, settings: &IndexSettings, locales: &LocaleSettings) -> Self {
        let include_review = params
            .include_review
            .as_deref()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);
        let mut statuses = vec![AssetStatus::Published];
        if include_review {
            statuses.push(AssetStatus::Review);
        }
        IndexRequest {
            statuses,
            types: AssetType::ALL
                .into_iter()
                .filter(|t| !matches!(t, AssetType::ClusterView | AssetType::Role))
                .collect(),
            languages: locales.resolve_many(params.langs.as_deref()),
            page: settings.page(params.page.as_deref()),
            limit: settings.limit(params.limit.as_deref()),
        }
    }

    fn accepts(&self, record: &CatalogIndexRecord) -> bool {
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&record.status);
        let type_ok = record.kind.known().map_or(false, |t| self.types.contains(&t));
        status_ok && type_ok && is_valid_slug(&record.slug)
    }
}

/// Non-empty, no `/`, no whitespace
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains('/') && !slug.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub slug: String,
    pub status: AssetStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub available_languages: Vec<Locale>,
    pub tags: Vec<String>,
    pub tag_order: Vec<String>,
}

impl IndexEntry {
    fn first(record: CatalogIndexRecord) -> Self {
        IndexEntry {
            id: record.id,
            kind: record.kind,
            slug: record.slug,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            available_languages: vec![record.language],
            tags: record.tags,
            tag_order: record.tag_order,
        }
    }

    fn absorb(&mut self, record: CatalogIndexRecord) {
        self.created_at = self.created_at.max(record.created_at);
        self.updated_at = self.updated_at.max(record.updated_at);
        if !self.available_languages.contains(&record.language) {
            self.available_languages.push(record.language);
        }
        self.tags.extend(record.tags);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPage {
    pub items: Vec<IndexEntry>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
}

/// Collapse per-locale records into one sorted entry per logical item
pub fn merge_records(records: impl IntoIterator<Item = CatalogIndexRecord>) -> Vec<IndexEntry> {
    let mut records: Vec<CatalogIndexRecord> = records.into_iter().collect();
    records.sort_by(|a, b| a.language.cmp(&b.language));

    let mut slots: FxHashMap<(String, String, String), usize> = FxHashMap::default();
    let mut entries: Vec<IndexEntry> = Vec::new();
    for record in records {
        let key = (record.kind.as_str().to_string(), record.slug.clone(), record.id.clone());
        match slots.get(&key) {
            Some(&idx) => entries[idx].absorb(record),
            None => {
                slots.insert(key, entries.len());
                entries.push(IndexEntry::first(record));
            }
        }
    }

    for entry in &mut entries {
        entry.available_languages.sort();
        entry.tags.sort();
        entry.tags.dedup();
    }
    entries.sort_by(|a, b| {
        a.kind
            .as_str()
            .cmp(b.kind.as_str())
            .then_with(|| a.slug.cmp(&b.slug))
            .then_with(|| a.id.cmp(&b.id))
    });
    entries
}

/// 1-based page slice of an already sorted list
pub fn paginate(entries: Vec<IndexEntry>, page: usize, limit: usize) -> IndexPage {
    let total = entries.len();
    let offset = page.saturating_sub(1).saturating_mul(limit).min(total);
    let end = offset.saturating_add(limit).min(total);
    let items: Vec<IndexEntry> = entries.into_iter().skip(offset).take(end - offset).collect();
    IndexPage {
        has_more: end < total,
        total,
        page,
        limit,
        items,
    }
}

#[derive(Clone)]
pub struct IndexMerger {
    reader: Arc<dyn GraphReader>,
}

impl IndexMerger {
    pub fn new(reader: Arc<dyn GraphReader>) -> Self {
        Self { reader }
    }

    pub async fn merge(&self, request: &IndexRequest) -> ViewResult<IndexPage> {
        let query = ReadQuery::CatalogIndex {
            types: request.types.clone(),
        };
        let batches = try_join_all(request.languages.iter().map(|lang| {
            let query = &query;
            async move {
                let rows = self.reader.run_read_query(query, lang).await?;
                Ok::<_, ViewError>(
                    rows.iter()
                        .map(|row| CatalogIndexRecord::from_row(row, lang))
                        .collect::<Vec<_>>(),
                )
            }
        }))
        .await?;

        let fetched: usize = batches.iter().map(Vec::len).sum();
        let entries = merge_records(
            batches
                .into_iter()
                .flatten()
                .filter(|record| request.accepts(record)),
        );
        debug!(
            "Index merged {} records from {} locales into {} entries",
            fetched,
            request.languages.len(),
            entries.len()
        );
        Ok(paginate(entries, request.page, request.limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ReadResult, Row};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn record(lang: &str, id: &str, slug: &str, updated_ms: i64) -> CatalogIndexRecord {
        CatalogIndexRecord {
            id: id.to_string(),
            kind: AssetKind::Known(AssetType::Tool),
            slug: slug.to_string(),
            status: AssetStatus::Published,
            created_at: None,
            updated_at: Utc.timestamp_millis_opt(updated_ms).single(),
            language: Locale::parse(lang).unwrap(),
            tags: vec![format!("tag-{}", lang)],
            tag_order: Vec::new(),
        }
    }

    #[test]
    fn test_merge_keeps_newest_timestamp_and_unions_languages() {
        let merged = merge_records(vec![record("en", "t1", "kanban", 2_000), record("de", "t1", "kanban", 5_000)]);
        assert_eq!(merged.len(), 1);
        let entry = &merged[0];
        assert_eq!(entry.updated_at, Utc.timestamp_millis_opt(5_000).single());
        assert_eq!(
            entry.available_languages,
            vec![Locale::parse("de").unwrap(), Locale::english()]
        );
        assert_eq!(entry.tags, vec!["tag-de", "tag-en"]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = merge_records(vec![record("en", "t1", "a", 1), record("de", "t1", "a", 9), record("de", "t2", "b", 3)]);
        let b = merge_records(vec![record("de", "t2", "b", 3), record("de", "t1", "a", 9), record("en", "t1", "a", 1)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_three_key_sort() {
        let mut method = record("en", "m1", "zeta", 0);
        method.kind = AssetKind::Known(AssetType::Method);
        let merged = merge_records(vec![
            record("en", "t2", "alpha", 0),
            record("en", "t1", "alpha", 0),
            method,
        ]);
        let keys: Vec<(&str, &str)> = merged.iter().map(|e| (e.kind.as_str(), e.id.as_str())).collect();
        assert_eq!(keys, vec![("METHOD", "m1"), ("TOOL", "t1"), ("TOOL", "t2")]);
    }

    #[test]
    fn test_paginate() {
        let entries = merge_records((0..5).map(|i| record("en", &format!("t{}", i), "s", 0)));
        let first = paginate(entries.clone(), 1, 2);
        assert_eq!(first.items.len(), 2);
        assert!(first.has_more);
        assert_eq!(first.total, 5);

        let last = paginate(entries.clone(), 3, 2);
        assert_eq!(last.items[0].id, "t4");
        assert!(!last.has_more);

        let beyond = paginate(entries, 9, 2);
        assert!(beyond.items.is_empty());
        assert!(!beyond.has_more);
    }

    #[test]
    fn test_slug_validity() {
        assert!(is_valid_slug("event-storming"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("a/b"));
        assert!(!is_valid_slug("a b"));
    }

    #[test]
    fn test_request_parsing() {
        let settings = IndexSettings::default();
        let locales = LocaleSettings::default();
        let params = IndexParams {
            status: Some("published".to_string()),
            limit: Some("5000".to_string()),
            page: Some("0".to_string()),
            ..Default::default()
        };
        let req = IndexRequest::system(&params, &settings, &locales).unwrap();
        assert_eq!(req.statuses, vec![AssetStatus::Published]);
        assert_eq!(req.limit, 1000);
        assert_eq!(req.page, 1);
        assert_eq!(req.types, AssetType::CONTENT.to_vec());

        let bad = IndexParams {
            types: Some("TOOL,GADGET".to_string()),
            ..Default::default()
        };
        assert!(matches!(IndexRequest::system(&bad, &settings, &locales), Err(ViewError::BadRequest(_))));

        let sitemap = IndexRequest::sitemap(
            &SitemapParams {
                include_review: Some("true".to_string()),
                ..Default::default()
            },
            &settings,
            &locales,
        );
        assert_eq!(sitemap.statuses, vec![AssetStatus::Published, AssetStatus::Review]);
        assert!(!sitemap.types.contains(&AssetType::Role));
        assert!(sitemap.types.contains(&AssetType::Segment));
    }

    /// Serves fixed rows per locale
    struct PerLocale(Vec<(&'static str, Vec<Value>)>);

    #[async_trait]
    impl GraphReader for PerLocale {
        async fn run_read_query(&self, _query: &ReadQuery, lang: &Locale) -> ReadResult<Vec<Row>> {
            Ok(self
                .0
                .iter()
                .filter(|(l, _)| *l == lang.as_str())
                .flat_map(|(_, rows)| rows.iter().filter_map(|r| r.as_object().cloned()))
                .collect())
        }
    }

    #[tokio::test]
    async fn test_merge_filters_before_merging() {
        let reader = PerLocale(vec![
            (
                "de",
                vec![
                    json!({"id": "t1", "type": "TOOL", "slug": "kanban", "status": "PUBLISHED", "updatedAt": 10}),
                    json!({"id": "t2", "type": "TOOL", "slug": "bad slug", "status": "PUBLISHED"}),
                ],
            ),
            (
                "en",
                vec![
                    json!({"id": "t1", "type": "TOOL", "slug": "kanban", "status": "PUBLISHED", "updatedAt": 20}),
                    json!({"id": "t3", "type": "TOOL", "slug": "draft", "status": "DRAFT"}),
                ],
            ),
        ]);
        let merger = IndexMerger::new(Arc::new(reader));
        let request = IndexRequest {
            statuses: vec![AssetStatus::Published],
            types: vec![AssetType::Tool],
            languages: vec![Locale::parse("de").unwrap(), Locale::english()],
            page: 1,
            limit: 10,
        };
        let page = merger.merge(&request).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "t1");
        assert_eq!(page.items[0].updated_at, Utc.timestamp_millis_opt(20).single());
        assert_eq!(page.items[0].available_languages.len(), 2);
    }
}
