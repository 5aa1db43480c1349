mod common;

use common::sample_reader;
use knowgraph::views::{IndexMerger, IndexParams, IndexRequest, IndexSettings, SitemapParams};
use knowgraph::{AssetType, Locale, LocaleSettings};

fn system(params: IndexParams) -> IndexRequest {
    IndexRequest::system(&params, &IndexSettings::default(), &LocaleSettings::default()).unwrap()
}

#[tokio::test]
async fn test_system_index_merges_locales() {
    let merger = IndexMerger::new(sample_reader());
    let page = merger.merge(&system(IndexParams::default())).await.unwrap();

    let keys: Vec<(&str, &str)> = page
        .items
        .iter()
        .map(|e| (e.kind.as_str(), e.slug.as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("CONCEPT", "jobs-to-be-done"),
            ("METHOD", "event-storming"),
            ("TECHNOLOGY", "feature-flags"),
            ("TOOL", "kanban-board"),
        ]
    );
    assert_eq!(page.items[0].available_languages, vec![Locale::english()]);
    assert_eq!(
        page.items[1].available_languages,
        vec![Locale::parse("de").unwrap(), Locale::english()]
    );
    assert_eq!(page.items[1].tags, vec!["modelling", "workshop"]);
    assert!(!page.has_more);
}

#[tokio::test]
async fn test_index_filters_and_pages() {
    let merger = IndexMerger::new(sample_reader());

    let published = system(IndexParams {
        status: Some("PUBLISHED".to_string()),
        ..Default::default()
    });
    let page = merger.merge(&published).await.unwrap();
    assert_eq!(page.total, 2);

    let english_tools = system(IndexParams {
        types: Some("TOOL".to_string()),
        languages: Some("en".to_string()),
        ..Default::default()
    });
    let page = merger.merge(&english_tools).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].available_languages, vec![Locale::english()]);

    let paged = system(IndexParams {
        page: Some("2".to_string()),
        limit: Some("3".to_string()),
        ..Default::default()
    });
    let first = merger.merge(&paged).await.unwrap();
    let again = merger.merge(&paged).await.unwrap();
    assert_eq!(first, again);
    assert_eq!(first.total, 4);
    assert_eq!(first.items.len(), 1);
    assert_eq!(first.items[0].kind.known(), Some(AssetType::Tool));
    assert!(!first.has_more);
}

#[tokio::test]
async fn test_sitemap() {
    let merger = IndexMerger::new(sample_reader());
    let settings = IndexSettings::default();
    let locales = LocaleSettings::default();

    let public = IndexRequest::sitemap(&SitemapParams::default(), &settings, &locales);
    let page = merger.merge(&public).await.unwrap();
    assert_eq!(page.total, 9);
    assert!(page
        .items
        .iter()
        .all(|e| !matches!(e.kind.known(), Some(AssetType::ClusterView) | Some(AssetType::Role))));

    let with_review = IndexRequest::sitemap(
        &SitemapParams {
            include_review: Some("true".to_string()),
            ..Default::default()
        },
        &settings,
        &locales,
    );
    assert_eq!(merger.merge(&with_review).await.unwrap().total, 10);
}
