//! HTTP handlers for the read API

use super::params::{LangQuery, QueryParams};
use super::server::AppState;
use crate::model::{ContentAsset, StructuralAsset};
use crate::views::{
    IndexPage, IndexParams, IndexRequest, MatrixParams, MatrixRequest, MatrixResponse, SitemapParams,
    ViewResult,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

/// Handler for system status
pub async fn status_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}

pub async fn overview_handler(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<Vec<StructuralAsset>>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.structure.overview(&lang).await?))
}

pub async fn macro_cluster_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<StructuralAsset>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.structure.macro_cluster(&slug, &lang).await?))
}

pub async fn cluster_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<StructuralAsset>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.structure.cluster(&slug, &lang).await?))
}

pub async fn catalog_handler(
    State(state): State<AppState>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<Vec<ContentAsset>>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.catalog.list(&lang).await?))
}

pub async fn catalog_item_handler(
    State(state): State<AppState>,
    Path((asset_type, slug)): Path<(String, String)>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<ContentAsset>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.catalog.by_type_and_slug(&asset_type, &slug, &lang).await?))
}

pub async fn catalog_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    QueryParams(q): QueryParams<LangQuery>,
) -> ViewResult<Json<ContentAsset>> {
    let lang = q.locale(&state.config.locales);
    Ok(Json(state.catalog.by_id(&id, &lang).await?))
}

/// Parameters are validated before any graph read
pub async fn matrix_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<MatrixParams>,
) -> ViewResult<Json<MatrixResponse>> {
    let request = MatrixRequest::from_params(&params, &state.config.matrix, &state.config.locales)?;
    Ok(Json(state.matrix.build(&request).await?))
}

pub async fn system_index_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<IndexParams>,
) -> ViewResult<Json<IndexPage>> {
    let request = IndexRequest::system(&params, &state.config.index, &state.config.locales)?;
    Ok(Json(state.index.merge(&request).await?))
}

pub async fn sitemap_handler(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SitemapParams>,
) -> ViewResult<Json<IndexPage>> {
    let request = IndexRequest::sitemap(&params, &state.config.index, &state.config.locales);
    Ok(Json(state.index.merge(&request).await?))
}
