//! HTTP server for the read API

use super::handler::{
    catalog_by_id_handler, catalog_handler, catalog_item_handler, cluster_handler, macro_cluster_handler,
    matrix_handler, overview_handler, sitemap_handler, status_handler, system_index_handler,
};
use crate::config::AppConfig;
use crate::graph::GraphReader;
use crate::views::{CatalogView, IndexMerger, MatrixEngine, StructureBuilder};
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared handler state; every view holds the same read port
#[derive(Clone)]
pub struct AppState {
    pub structure: StructureBuilder,
    pub catalog: CatalogView,
    pub matrix: MatrixEngine,
    pub index: IndexMerger,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(reader: Arc<dyn GraphReader>, config: AppConfig) -> Self {
        Self {
            structure: StructureBuilder::new(Arc::clone(&reader)),
            catalog: CatalogView::new(Arc::clone(&reader)),
            matrix: MatrixEngine::new(Arc::clone(&reader)),
            index: IndexMerger::new(reader),
            config: Arc::new(config),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/grid/overview", get(overview_handler))
        .route("/grid/macroclusters/:slug", get(macro_cluster_handler))
        .route("/grid/clusters/:slug", get(cluster_handler))
        .route("/catalog", get(catalog_handler))
        .route("/catalog/:key", get(catalog_by_id_handler))
        .route("/catalog/:key/:slug", get(catalog_item_handler))
        .route("/matrix", get(matrix_handler))
        .route("/system/catalog/index", get(system_index_handler))
        .route("/public/sitemap/nodes", get(sitemap_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server exposing the grid, catalog, matrix and index views
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(reader: Arc<dyn GraphReader>, config: AppConfig) -> Self {
        Self {
            state: AppState::new(reader, config),
        }
    }

    /// Start the HTTP server
    pub async fn start(&self) -> std::io::Result<()> {
        let addr = self.state.config.bind_address();
        let app = router(self.state.clone());
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("knowgraph API listening on http://{}", addr);

        axum::serve(listener, app).await
    }
}
