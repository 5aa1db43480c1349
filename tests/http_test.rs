mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use common::{add_node, sample_reader};
use http_body_util::BodyExt;
use knowgraph::graph::{GraphStore, MemoryGraph};
use knowgraph::model::AssetType;
use knowgraph::{router, AppConfig, AppState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(sample_reader(), AppConfig::default()))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_status() {
    let (status, json) = get(app(), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], knowgraph::VERSION);
}

#[tokio::test]
async fn test_grid_endpoints() {
    let (status, json) = get(app(), "/grid/overview?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["slug"], "product");
    assert_eq!(json[0]["type"], "MACRO_CLUSTER");
    assert_eq!(json[0]["childrenCount"], 2);

    let (status, json) = get(app(), "/grid/clusters/discovery?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    let segments = json["children"].as_array().unwrap();
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|s| s["type"] == "SEGMENT"));
    assert_eq!(segments[1]["children"][0]["type"], "METHOD");

    let (status, json) = get(app(), "/grid/macroclusters/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not_found");
    assert!(json["message"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_catalog_endpoints() {
    let (status, json) = get(app(), "/catalog?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 4);

    let (status, json) = get(app(), "/catalog/tool/kanban-board?lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Kanban Board");

    // Default locale is German
    let (status, json) = get(app(), "/catalog/t-kanban").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Kanban-Board");

    let (status, json) = get(app(), "/catalog/SEGMENT/flow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "bad_request");

    let (status, _) = get(app(), "/catalog/missing-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_matrix_endpoint() {
    let (status, json) = get(app(), "/matrix?clusterId=c-discovery").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("mode"));

    let (status, json) = get(
        app(),
        "/matrix?clusterId=c-discovery&mode=SEGMENT_PERSPECTIVE&perspective=VALUE_STREAM&cellLimit=1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "SEGMENT_PERSPECTIVE");
    assert_eq!(json["perspective"], "VALUE_STREAM");
    assert_eq!(json["cells"].as_array().unwrap().len(), 8);
    assert_eq!(json["stats"]["nonEmptyCells"], 2);
    assert_eq!(json["stats"]["cellLimit"], 1);
    for cell in json["cells"].as_array().unwrap() {
        let count = cell["count"].as_u64().unwrap();
        let shown = cell["items"].as_array().unwrap().len() as u64;
        assert_eq!(cell["hasMore"].as_bool().unwrap(), count > shown);
    }
}

#[tokio::test]
async fn test_index_endpoints() {
    let (status, json) = get(app(), "/system/catalog/index?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 4);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["hasMore"], true);
    assert_eq!(json["items"][0]["type"], "CONCEPT");
    assert_eq!(json["items"][1]["availableLanguages"], serde_json::json!(["de", "en"]));

    let (status, _) = get(app(), "/system/catalog/index?status=ARCHIVED_FOREVER").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = get(app(), "/public/sitemap/nodes?includeReview=true&langs=fr,xx").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 10);
}

#[tokio::test]
async fn test_repeated_parameters_use_first_value() {
    let (status, json) = get(app(), "/catalog?lang=en&lang=de").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["name"].as_str())
        .collect();
    assert!(names.contains(&"Kanban Board"));

    let (status, json) = get(app(), "/catalog/t-kanban?lang=de&lang=en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Kanban-Board");

    let (status, json) = get(
        app(),
        "/matrix?clusterId=c-discovery&mode=SEGMENT_PERSPECTIVE&mode=DIAGONAL&perspective=VALUE_STREAM",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "SEGMENT_PERSPECTIVE");

    let (status, json) = get(app(), "/system/catalog/index?status=PUBLISHED&status=BOGUS").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);

    let (status, json) = get(app(), "/public/sitemap/nodes?includeReview=true&includeReview=false").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 10);
}

#[tokio::test]
async fn test_missing_cluster_view_is_404() {
    let mut store = GraphStore::new();
    add_node(&mut store, AssetType::Cluster, "orphan", "Orphan");
    let app = router(AppState::new(Arc::new(MemoryGraph::new(store)), AppConfig::default()));

    let (status, json) = get(app, "/grid/clusters/orphan").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "integrity_violation");
}
